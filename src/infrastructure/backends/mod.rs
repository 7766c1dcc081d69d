pub mod canned;

use anyhow::Result;

use crate::configuration::Config;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;

pub struct BackendManager {}

impl BackendManager {
    pub fn get(name: BackendName) -> Result<BackendBox> {
        match name {
            BackendName::Canned => {
                return Ok(Box::new(canned::Canned::new(Config::typing_delay()?)));
            }
        }
    }
}
