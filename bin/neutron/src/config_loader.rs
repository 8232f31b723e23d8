use anyhow::Result;
use neutron_common::config::NeutronConfig;
use neutron_common::Address;
use std::path::{Path, PathBuf};

pub fn load_neutron_config<P: AsRef<Path>>(
    path: P,
    data_dir_override: Option<PathBuf>,
    miner_override: Option<Address>,
) -> Result<NeutronConfig> {
    let mut config = NeutronConfig::load(path.as_ref())?;

    if let Some(dd) = data_dir_override {
        config.chain.data_dir = dd;
    }

    if let Some(miner) = miner_override {
        config.chain.miner = miner;
    }

    Ok(config)
}
