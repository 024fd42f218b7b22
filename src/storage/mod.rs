// Storage module: Postgres persistence for visitation records.

pub mod postgres;

pub use postgres::{ParkYoy, PgStorage, PgVisitSource, StateMonthVisits};
