//! Convenience macros for the bridge project
#![macro_use]

/// Define and export a specific port module (transparently pulls
/// its namespace to the current one).
///
/// Used mostly to conveniently fit the module declaration and reexport
/// under a single configuration flag.
///
/// # Example
/// ```ignore
/// #[cfg(feature = "stm32f446")]
/// port!(nucleo_f446re: [bridge, pin_configuration,]);
/// // Expands into:
/// pub mod nucleo_f446re { pub mod bridge; pub mod pin_configuration; }
/// pub use self::nucleo_f446re::{bridge, pin_configuration};
/// ```
#[macro_export]
macro_rules! port {
    ($mod:ident) => {
        pub mod $mod;
        pub use self::$mod::*;
    };
    ($outer:ident: [$($inner:ident,)+]) => {
        pub mod $outer {
        $(
            pub mod $inner;
        )+
        }
        $(
            pub use self::$outer::$inner;
        )+
    };
}
