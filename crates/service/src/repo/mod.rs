pub mod seaorm;

pub use seaorm::SeaOrmGateway;
