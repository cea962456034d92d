//! Tools for fusing a lane-level map with a street network, bundled as a single executable.

#[macro_use]
extern crate log;

mod align;
mod configuration;
mod conflate;

use anyhow::Result;
use structopt::StructOpt;

use fusion_util::Timer;
use lanelet_map::LaneletMap;

#[derive(StructOpt)]
#[structopt(
    name = "lanelet_osm",
    about = "Transfers street network tags onto a lane-level map"
)]
enum Command {
    /// Splits lanelets where the street network's tags change, copies the tags over, checks lane
    /// counts, and writes the finalized map along with the deleted lanelets and lane colors.
    Conflate {
        /// The path to a JSON lane-level map
        #[structopt(long)]
        map: String,
        /// The path to a JSON list of matches between reference and target routes
        #[structopt(long)]
        matches: String,
        /// The directory to write results into
        #[structopt(long)]
        output: String,
        /// A TOML file with settings. When given, its `[conflation]` section replaces the flags
        /// below.
        #[structopt(long)]
        config: Option<String>,
        #[structopt(flatten)]
        opts: conflation::ConflationOptions,
    },
    /// Moves a map into another coordinate frame, using two recordings of the same drive.
    Align {
        /// The path to a JSON lane-level map, in the frame of the target trajectory
        #[structopt(long)]
        map: String,
        /// A JSON list of points recorded in the frame to move the map into
        #[structopt(long)]
        master: String,
        /// A JSON list of points, the same drive recorded in the map's frame
        #[structopt(long)]
        target: String,
        /// The path to write the transformed map
        #[structopt(long)]
        output: String,
        /// A TOML file with settings. When given, its `[align]` section replaces the flags below.
        #[structopt(long)]
        config: Option<String>,
        #[structopt(flatten)]
        opts: map_align::AlignOptions,
    },
    /// Prints how many objects of each kind a map has.
    Summarize {
        /// The path to a JSON lane-level map
        #[structopt(long)]
        map: String,
    },
}

fn main() -> Result<()> {
    fusion_util::logger::setup();

    match Command::from_args() {
        Command::Conflate {
            map,
            matches,
            output,
            config,
            opts,
        } => {
            let opts = match config {
                Some(path) => configuration::load_configuration(&path)?.conflation,
                None => opts,
            };
            conflate::run(map, matches, output, opts)?;
        }
        Command::Align {
            map,
            master,
            target,
            output,
            config,
            opts,
        } => {
            let opts = match config {
                Some(path) => configuration::load_configuration(&path)?.align,
                None => opts,
            };
            align::run(map, master, target, output, opts)?;
        }
        Command::Summarize { map } => summarize(map)?,
    }
    Ok(())
}

fn summarize(path: String) -> Result<()> {
    let mut timer = Timer::new(format!("summarize {}", path));
    timer.start("load map");
    let map = LaneletMap::load(&path)?;
    timer.stop("load map");
    println!("{}", map.describe());

    let curves: Vec<_> = map.all_curves().keys().cloned().collect();
    println!(
        "{} points are shared by more than one curve",
        map_align::intersection_nodes(&map, &curves).len()
    );
    Ok(())
}
