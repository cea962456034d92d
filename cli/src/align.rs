use anyhow::{Context, Result};

use fusion_util::{read_json, Timer};
use geom::{PolyLine, Pt3D};
use lanelet_map::LaneletMap;
use map_align::{get_transformation, transform_map, AlignOptions};

pub fn run(
    map_path: String,
    master_path: String,
    target_path: String,
    output: String,
    opts: AlignOptions,
) -> Result<()> {
    let mut timer = Timer::new(format!("align {}", map_path));

    timer.start("load input");
    let mut map = LaneletMap::load(&map_path)?;
    let master = load_trajectory(&master_path)?;
    let target = load_trajectory(&target_path)?;
    timer.stop("load input");
    info!(
        "Master trajectory is {} long, target is {}",
        master.length(),
        target.length()
    );

    timer.start(format!("{} fit", opts.algorithm));
    let transform = get_transformation(&master, &target, &opts)?;
    timer.stop(format!("{} fit", opts.algorithm));

    transform_map(&mut map, &transform)?;
    map.save(&output)?;
    Ok(())
}

fn load_trajectory(path: &str) -> Result<PolyLine> {
    let pts: Vec<Pt3D> = read_json(path)?;
    PolyLine::new(pts).with_context(|| format!("trajectory in {}", path))
}
