//! Coordinate parsing for command line flags.

use anyhow::Result;
use flyover_core::geo::Coordinate;

/// Parse a `lon,lat` pair as taken by the CLI flags.
pub fn parse_lon_lat(raw: &str) -> Result<Coordinate> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("expected \"lon,lat\", got {raw:?}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("bad longitude in {raw:?}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("bad latitude in {raw:?}"))?;

    let at = Coordinate::new(lon, lat);
    at.validate()?;
    Ok(at)
}
