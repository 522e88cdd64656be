macro_rules! value_from {
    ($target:ident, $variant:ident: $($t:ty),*) => ($(
        impl From<$t> for $crate::$target {
            fn from(value: $t) -> Self {
                Self::$variant(value.into())
            }
        }
    )*)
}
