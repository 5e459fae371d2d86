use crate::client::test_helpers::*;
use crate::error::Error;
use crate::types::{Event, MagnetDisposition};

mod login;
