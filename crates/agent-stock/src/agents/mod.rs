//! Stock analysis agents

pub mod fundamental;
pub mod news;
pub mod reflector;
pub mod researcher;
pub mod technical;
pub mod trader;

pub use fundamental::FundamentalAnalyst;
pub use news::NewsAnalyst;
pub use reflector::Reflector;
pub use researcher::{Researcher, Thesis};
pub use technical::TechnicalAnalyst;
pub use trader::Trader;
