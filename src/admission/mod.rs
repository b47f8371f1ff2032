pub mod controller;
pub mod notice;

pub use controller::{AdmissionController, RoundOutcome, RoundReport, SkipReason};
pub use notice::{Notice, NoticeBoard};
