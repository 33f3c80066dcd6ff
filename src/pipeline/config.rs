use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;

use crate::{
    detect::{
        classify::ClassifierConfig, extract::ExtractConfig, preprocess::PreprocessConfig,
        select::SelectorConfig,
    },
    foundation::error::{LettererError, LettererResult},
    render::{panel::StyleConfig, strip::StripConfig},
    text::fit::FitConfig,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Every calibration value of the lettering pipeline. Missing JSON fields take defaults.
pub struct LettererConfig {
    pub preprocess: PreprocessConfig,
    pub extract: ExtractConfig,
    pub classifier: ClassifierConfig,
    pub selector: SelectorConfig,
    pub fit: FitConfig,
    pub style: StyleConfig,
    pub strip: StripConfig,
}

impl LettererConfig {
    pub fn from_json_str(s: &str) -> LettererResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| LettererError::config(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path(path: &Path) -> LettererResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| LettererError::config(format!("parse config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> LettererResult<()> {
        self.preprocess.validate()?;
        self.extract.validate()?;
        self.classifier.validate()?;
        self.selector.validate()?;
        self.fit.validate()?;
        self.style.validate()?;
        self.strip.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
