#[macro_export]
macro_rules! params {
    () => {
        $crate::parameters::Parameters::None
    };
    ($($param:expr),+ $(,)?) => {
        $crate::parameters::Parameters::Positional(vec![$($param.into()),+])
    };
}

#[macro_export]
macro_rules! assert_ok {
    ($expr:expr $(,)?) => {
        match $expr {
            Ok(value) => value,
            Err(error) => panic!("expected Ok(..), got Err({:?})", error),
        }
    };
}
