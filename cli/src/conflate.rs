use anyhow::Result;

use conflation::{conflate, finalize_map, remove_generated_tags, ConflationOptions, Match};
use fusion_util::{read_json, write_json, Timer};
use lanelet_map::LaneletMap;

pub fn run(
    map_path: String,
    matches_path: String,
    output: String,
    opts: ConflationOptions,
) -> Result<()> {
    let mut timer = Timer::new(format!("conflate {}", map_path));

    timer.start("load input");
    let mut map = LaneletMap::load(&map_path)?;
    let mut matches: Vec<Match> = read_json(&matches_path)?;
    timer.stop("load input");
    timer.note(format!("Loaded {}", map.describe()));

    let cleaned = remove_generated_tags(&mut map);
    if cleaned > 0 {
        debug!("Removed generated tags from {} points", cleaned);
    }

    let result = conflate(&mut map, &mut matches, &opts, &mut timer);
    let finalized = finalize_map(&map, &result.deleted, &mut timer)?;

    timer.start("write output");
    fs_err::create_dir_all(&output)?;
    finalized.save(&format!("{}/map_conflated.json", output))?;
    write_json(&format!("{}/deleted.json", output), &result.deleted)?;
    write_json(&format!("{}/colors.json", output), &result.color_names())?;
    timer.stop("write output");
    Ok(())
}
