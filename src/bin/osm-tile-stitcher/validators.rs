use osm_tile_stitcher::{FailurePolicy, Fixture, PartitionPolicy, MAX_LATITUDE};

pub fn parse_geo_coord(v: &str) -> Result<f64, String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if val < -180f64 {
        return Err("must be >= -180°".to_owned());
    } else if val >= 180f64 {
        return Err("must be < 180°".to_owned());
    }

    Ok(val)
}

pub fn parse_latitude(v: &str) -> Result<f64, String> {
    let val = parse_geo_coord(v)?;

    if val.abs() >= MAX_LATITUDE {
        return Err(format!("must be strictly inside ±{MAX_LATITUDE}°"));
    }

    Ok(val)
}

pub fn parse_fixture(v: &str) -> Result<Fixture, String> {
    v.parse::<Fixture>().map_err(|err| err.to_owned())
}

pub fn parse_mode(v: &str) -> Result<PartitionPolicy, String> {
    v.parse()
}

pub fn parse_failure_policy(v: &str) -> Result<FailurePolicy, String> {
    v.parse::<FailurePolicy>().map_err(|err| err.to_owned())
}
