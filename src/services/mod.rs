pub mod history;
pub mod normalize;
pub mod openweather;
pub mod weather;
