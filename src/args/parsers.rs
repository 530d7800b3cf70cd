use std::time::Duration;

use super::types::PositiveUsize;
use crate::config::parse_duration_value;
use crate::error::{AppError, AppResult};

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}
