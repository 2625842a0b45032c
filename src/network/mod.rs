pub mod activation;
pub mod feed_forward;
pub mod topology;

pub use activation::gelu;
pub use feed_forward::{Network, Scratch};
pub use topology::{calc_network_size, Topology};
