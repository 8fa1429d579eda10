//! Logging helpers that forward to [`defmt`](https://docs.rs/defmt) when the `defmt` feature is
//! enabled.
//!
//! Without the feature the arguments are still borrowed so that they are type checked and no
//! unused variable warnings show up at the call site.

macro_rules! log_macro {
    ($name:ident, $level:ident, $d:tt) => {
        #[collapse_debuginfo(yes)]
        macro_rules! $name {
            ($d s:literal $d(, $d x:expr)* $d(,)?) => {{
                #[cfg(feature = "defmt")]
                defmt::$level!($d s $d(, $d x)*);
                #[cfg(not(feature = "defmt"))]
                let _ = ($d(&$d x),*);
            }};
        }

        #[allow(unused_imports)]
        pub(crate) use $name;
    };
}

log_macro!(error, error, $);
log_macro!(info, info, $);
log_macro!(debug, debug, $);

#[collapse_debuginfo(yes)]
macro_rules! panic {
    ($($x:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::panic!($($x)*);
        #[cfg(not(feature = "defmt"))]
        core::panic!($($x)*);
    }};
}

pub(crate) use panic;
