#[macro_export]
macro_rules! string_newtype {
    ($name:ty) => {
        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}
