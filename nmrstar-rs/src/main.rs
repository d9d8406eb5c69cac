use std::path::PathBuf;

use anyhow::Result;
use anyhow_ext::Context;
use fallible_iterator::FallibleIterator;

use nmrstar::NmrStarFile;
use nmrstar::iterator::RelaxationIterator;

fn test_file_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("data");
    path.push("deposition.str");
    path
}

fn main() -> Result<()> {
    let star = NmrStarFile::open(test_file_path()).dot()?;

    println!("=== NMR-STAR summary ===");
    println!("title:      data_{}", star.document().title);
    println!("version:    {}", star.version());
    println!("data nodes: {}", star.document().datanodes.len());

    let mut iter = RelaxationIterator::new(star.document(), star.relaxation());
    while let Some(frame) = iter.next()? {
        println!(
            "{} at {} MHz: {} spins, first value {:?}",
            frame.data_type,
            frame.frq / 1e6,
            frame.res_nums.len(),
            frame.values.first()
        );
    }

    for entity in star.entity_frames()? {
        println!(
            "entity {:?}: {} residues",
            entity.mol_name,
            entity.res_nums.len()
        );
    }

    Ok(())
}
