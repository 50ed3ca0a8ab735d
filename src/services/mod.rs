// Services: rule engines, kept free of HTTP and SQL
pub mod assessment;
pub mod chat;
pub mod doctors;
pub mod guidance;
pub mod injury;
pub mod risk;
pub mod voice;
