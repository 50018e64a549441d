//! Full project ports for specific targets. They mainly
//! provide a method to construct a generic bridge from
//! specific parts.

#[cfg(feature = "stm32f446")]
port!(nucleo_f446re: [bridge, pin_configuration,]);
