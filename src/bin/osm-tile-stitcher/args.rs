use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{command, value_parser, Arg, ArgAction, ArgMatches};

use crate::validators::*;
use osm_tile_stitcher::{
    BoundingBox, Config, FailurePolicy, Fixture, PartitionPolicy, RegionSpec, UrlFormat,
    DEFAULT_TILE_URL, MAX_ZOOM,
};

const URL_ARG: &str = "url";
const ZOOM_ARG: &str = "zoom";
const MODE_ARG: &str = "mode";
const TILE_SIZE_ARG: &str = "tile_size";
const CACHE_DIR_ARG: &str = "cache_dir";
const OUTPUT_DIR_ARG: &str = "output_dir";
const BBOX_FIXTURE_ARG: &str = "fixture";
const BBOX_NORTH_ARG: &str = "north";
const BBOX_SOUTH_ARG: &str = "south";
const BBOX_WEST_ARG: &str = "west";
const BBOX_EAST_ARG: &str = "east";
const CENTER_LAT_ARG: &str = "center_lat";
const CENTER_LON_ARG: &str = "center_lon";
const WINDOW_ARG: &str = "window";
const USER_AGENT_ARG: &str = "user_agent";
const ON_FAILURE_ARG: &str = "on_failure";
const TIMEOUT_ARG: &str = "timeout";
const DRY_RUN_ARG: &str = "dry_run";
const SKIP_EMPTY_ARG: &str = "skip_empty";
const REQUEST_RETRIES_ARG: &str = "num_retries";
const PARALLEL_FETCHES_ARG: &str = "num_parallel";

const DEFAULT_USER_AGENT: &str = concat!("osm-tile-stitcher_rs_", env!("CARGO_PKG_VERSION"));

pub struct Args {
    pub region: RegionSpec,
    pub zoom: u8,
    pub tile_size: usize,
    pub partition: PartitionPolicy,
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub url: String,
    pub user_agent: String,
    pub on_failure: FailurePolicy,
    pub parallel_fetches: usize,
    pub retries: u8,
    pub timeout: Duration,
    pub skip_empty: bool,
    pub dry_run: bool,
}

impl std::convert::From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            region: args.region,
            zoom: args.zoom,
            tile_size: args.tile_size,
            partition: args.partition,
            cache_dir: args.cache_dir,
            output_dir: args.output_dir,
            url: UrlFormat::from_string(args.url),
            user_agent: args.user_agent,
            on_failure: args.on_failure,
            fetch_rate: args.parallel_fetches,
            request_retries: args.retries,
            timeout: args.timeout,
            skip_empty: args.skip_empty,
        }
    }
}

impl Args {
    pub fn parse() -> Result<Self> {
        let matches = get_matches();

        let region = if let Some(&latitude) = matches.get_one::<f64>(CENTER_LAT_ARG) {
            // center point mode takes precedence if specified
            RegionSpec::Centered {
                latitude,
                longitude: *matches.get_one::<f64>(CENTER_LON_ARG).unwrap(),
                window: *matches.get_one::<u32>(WINDOW_ARG).unwrap() as usize,
            }
        } else if let Some(&fixture) = matches.get_one::<Fixture>(BBOX_FIXTURE_ARG) {
            // if a fixture is specified, construct the bounding box from that
            RegionSpec::BoundingBox(BoundingBox::from_fixture(fixture))
        } else {
            // otherwise, combine the 4 coords
            RegionSpec::BoundingBox(BoundingBox::new(
                *matches.get_one::<f64>(BBOX_NORTH_ARG).unwrap(),
                *matches.get_one::<f64>(BBOX_EAST_ARG).unwrap(),
                *matches.get_one::<f64>(BBOX_SOUTH_ARG).unwrap(),
                *matches.get_one::<f64>(BBOX_WEST_ARG).unwrap(),
            )?)
        };

        Ok(Self {
            region,
            zoom: *matches.get_one::<u8>(ZOOM_ARG).unwrap(),
            tile_size: *matches.get_one::<u32>(TILE_SIZE_ARG).unwrap() as usize,
            partition: *matches.get_one::<PartitionPolicy>(MODE_ARG).unwrap(),
            cache_dir: matches.get_one::<String>(CACHE_DIR_ARG).unwrap().into(),
            output_dir: matches.get_one::<String>(OUTPUT_DIR_ARG).unwrap().into(),
            url: matches.get_one::<String>(URL_ARG).unwrap().to_owned(),
            user_agent: matches.get_one::<String>(USER_AGENT_ARG).unwrap().to_owned(),
            on_failure: *matches.get_one::<FailurePolicy>(ON_FAILURE_ARG).unwrap(),
            parallel_fetches: *matches.get_one::<u32>(PARALLEL_FETCHES_ARG).unwrap() as usize,
            retries: *matches.get_one::<u8>(REQUEST_RETRIES_ARG).unwrap(),
            timeout: Duration::from_secs(*matches.get_one::<u64>(TIMEOUT_ARG).unwrap()),
            skip_empty: matches.get_flag(SKIP_EMPTY_ARG),
            dry_run: matches.get_flag(DRY_RUN_ARG),
        })
    }
}

fn get_matches() -> ArgMatches {
    command!()
        .arg(
            Arg::new(BBOX_NORTH_ARG)
                .help("Latitude of north bounding box boundary (in degrees)")
                .required_unless_present_any([BBOX_FIXTURE_ARG, CENTER_LAT_ARG])
                .value_parser(parse_latitude)
                .allow_hyphen_values(true)
                .short('n')
                .long("north"),
        )
        .arg(
            Arg::new(BBOX_SOUTH_ARG)
                .help("Latitude of south bounding box boundary (in degrees)")
                .required_unless_present_any([BBOX_FIXTURE_ARG, CENTER_LAT_ARG])
                .value_parser(parse_latitude)
                .allow_hyphen_values(true)
                .short('s')
                .long("south"),
        )
        .arg(
            Arg::new(BBOX_EAST_ARG)
                .help("Longitude of east bounding box boundary (in degrees)")
                .required_unless_present_any([BBOX_FIXTURE_ARG, CENTER_LAT_ARG])
                .value_parser(parse_geo_coord)
                .allow_hyphen_values(true)
                .short('e')
                .long("east"),
        )
        .arg(
            Arg::new(BBOX_WEST_ARG)
                .help("Longitude of west bounding box boundary (in degrees)")
                .required_unless_present_any([BBOX_FIXTURE_ARG, CENTER_LAT_ARG])
                .value_parser(parse_geo_coord)
                .allow_hyphen_values(true)
                .short('w')
                .long("west"),
        )
        .arg(
            Arg::new(BBOX_FIXTURE_ARG)
                .help("Use a known, named bounding box (eg. calvert, aachen)")
                .value_parser(parse_fixture)
                .conflicts_with_all([BBOX_NORTH_ARG, BBOX_SOUTH_ARG, BBOX_EAST_ARG, BBOX_WEST_ARG])
                .short('f')
                .long("fixture"),
        )
        .arg(
            Arg::new(CENTER_LAT_ARG)
                .help("Latitude of the window center (alternative to a bounding box)")
                .value_parser(parse_latitude)
                .allow_hyphen_values(true)
                .requires(CENTER_LON_ARG)
                .conflicts_with_all([
                    BBOX_NORTH_ARG,
                    BBOX_SOUTH_ARG,
                    BBOX_EAST_ARG,
                    BBOX_WEST_ARG,
                    BBOX_FIXTURE_ARG,
                ])
                .long("center-lat"),
        )
        .arg(
            Arg::new(CENTER_LON_ARG)
                .help("Longitude of the window center")
                .value_parser(parse_geo_coord)
                .allow_hyphen_values(true)
                .requires(CENTER_LAT_ARG)
                .long("center-lon"),
        )
        .arg(
            Arg::new(WINDOW_ARG)
                .help("Window size around the center, in tiles per side")
                .value_parser(value_parser!(u32).range(2..))
                .default_value("8")
                .long("window"),
        )
        .arg(
            Arg::new(ZOOM_ARG)
                .help("The zoom level to fetch and stitch at")
                .value_parser(value_parser!(u8).range(0..=MAX_ZOOM as i64))
                .required(true)
                .short('z')
                .long("zoom"),
        )
        .arg(
            Arg::new(MODE_ARG)
                .help("How to partition the output: `single`, `quadrant` or `chunk:N`")
                .value_parser(parse_mode)
                .default_value("single")
                .short('m')
                .long("mode"),
        )
        .arg(
            Arg::new(TILE_SIZE_ARG)
                .help("Edge length of one source tile in pixels")
                .value_parser(value_parser!(u32).range(1..))
                .default_value("256")
                .long("tile-size"),
        )
        .arg(
            Arg::new(PARALLEL_FETCHES_ARG)
                .help("The amount of tiles fetched in parallel.")
                .value_parser(value_parser!(u32).range(1..))
                .default_value("5")
                .short('r')
                .long("rate"),
        )
        .arg(
            Arg::new(REQUEST_RETRIES_ARG)
                .help("The amount of times to retry a failed HTTP request.")
                .value_parser(value_parser!(u8))
                .default_value("3")
                .long("retries"),
        )
        .arg(
            Arg::new(TIMEOUT_ARG)
                .help("The timeout (in seconds) for fetching a single tile. Pass 0 for no timeout.")
                .value_parser(value_parser!(u64))
                .default_value("10")
                .short('t')
                .long("timeout"),
        )
        .arg(
            Arg::new(ON_FAILURE_ARG)
                .help("What to do when a single tile fails: `skip` it or `abort` the run")
                .value_parser(parse_failure_policy)
                .default_value("skip")
                .long("on-failure"),
        )
        .arg(
            Arg::new(CACHE_DIR_ARG)
                .help("The folder downloaded tiles are cached in")
                .default_value("tiles")
                .long("cache-dir"),
        )
        .arg(
            Arg::new(OUTPUT_DIR_ARG)
                .help("The folder the stitched images are written to")
                .default_value("stitched")
                .short('o')
                .long("output"),
        )
        .arg(
            Arg::new(URL_ARG)
                .help(
                    "The URL with format specifiers `{x}`, `{y}`, `{z}` to fetch the tiles \
                     from. Also supports the format specifier `{s}` which is replaced with \
                     `a`, `b` or `c` to spread the load between different servers.",
                )
                .default_value(DEFAULT_TILE_URL)
                .short('u')
                .long("url"),
        )
        .arg(
            Arg::new(USER_AGENT_ARG)
                .help("Identifying User-Agent header, required by public tile server policies")
                .default_value(DEFAULT_USER_AGENT)
                .long("user-agent"),
        )
        .arg(
            Arg::new(SKIP_EMPTY_ARG)
                .help("Don't save partitions in which every tile is missing")
                .action(ArgAction::SetTrue)
                .long("skip-empty"),
        )
        .arg(
            Arg::new(DRY_RUN_ARG)
                .help("Don't actually fetch anything, just determine how many tiles would be fetched.")
                .action(ArgAction::SetTrue)
                .long("dry-run"),
        )
        .get_matches()
}
