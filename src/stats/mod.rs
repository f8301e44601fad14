pub mod history;

pub use history::StatsStore;
