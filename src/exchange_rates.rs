// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::Local;
use csv::Writer;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::api::{ApiClient, RatesEndpoint, RatesResponse};
use crate::error::{Error, Result};
use crate::models::{Catalogue, Currency, RateUpdate};

/// Fetch the USD rate feed and overwrite catalogue rates
pub async fn refresh_rates(client: &ApiClient, catalogue: &mut Catalogue) -> Result<RateUpdate> {
    info!("Fetching current exchange rates...");
    let response: RatesResponse = client.send(&RatesEndpoint::default()).await?;

    if response.base != "USD" {
        return Err(Error::InvalidArgument(format!(
            "rate feed is quoted against {}, expected USD",
            response.base
        )));
    }

    let update = catalogue.apply_rates(&response.rates);
    if !update.unknown.is_empty() {
        warn!(codes = ?update.unknown, "feed carries currencies outside the catalogue");
    }
    info!(
        updated = update.updated.len(),
        unknown = update.unknown.len(),
        rejected = update.rejected.len(),
        "Exchange rates applied"
    );
    Ok(update)
}

pub fn default_export_path() -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from("output").join(format!("currencies_{}.csv", timestamp))
}

/// Export a list of currencies to CSV
pub fn export_currencies_csv<'a, I>(currencies: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a Currency>,
{
    let io_err = |e: std::io::Error| Error::Io(format!("{}: {}", path.display(), e));
    let csv_err = |e: csv::Error| Error::Io(format!("{}: {}", path.display(), e));

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let mut writer = Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(["Code", "Name", "Symbol", "Region", "Popular", "Rate per USD"])
        .map_err(csv_err)?;

    let mut rows = 0;
    for currency in currencies {
        writer
            .write_record([
                currency.code.as_str(),
                currency.name.as_str(),
                currency.symbol.as_str(),
                currency.region.name(),
                if currency.is_popular { "true" } else { "false" },
                currency.conversion_rate.to_string().as_str(),
            ])
            .map_err(csv_err)?;
        rows += 1;
    }

    writer.flush().map_err(io_err)?;
    info!(rows, path = %path.display(), "currencies written to CSV");
    Ok(rows)
}
