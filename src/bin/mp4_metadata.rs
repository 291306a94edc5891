use mp4meta::{Demux, NativeDemuxer, ThermalMetadata};
use std::env;
use std::fs;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some((file_path, cover_path)) = parse_args(&args) else {
        println!("Usage: mp4_metadata <file.mp4> [--cover <cover_file>]");
        println!("Example: mp4_metadata flight_0001.mp4 --cover cover.jpg");
        return;
    };

    if let Err(e) = print_metadata(&file_path, cover_path.as_deref()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Option<(String, Option<String>)> {
    let mut file_path = None;
    let mut cover_path = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cover" => cover_path = Some(iter.next()?.clone()),
            _ if file_path.is_none() => file_path = Some(arg.clone()),
            _ => return None,
        }
    }
    Some((file_path?, cover_path))
}

fn print_metadata(path: &str, cover_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let backend = NativeDemuxer::load()?;
    let mut demux = Demux::open(&backend, path)?;

    println!("File: {}", path);

    let metadata = demux.metadata();
    if metadata.is_empty() {
        println!("No metadata");
    } else {
        println!("Metadata:");
        let mut entries: Vec<_> = metadata.iter().collect();
        entries.sort();
        for (key, value) in entries {
            println!("  {}: {}", key, value);
        }
    }

    let thermal = ThermalMetadata::from_map(&metadata);
    if thermal.is_thermal() {
        println!(
            "Thermal: metaversion={} alignment={}",
            thermal.metaversion.as_deref().unwrap_or("-"),
            thermal.alignment.as_deref().unwrap_or("-")
        );
    }

    if let Some(cover) = demux.cover() {
        println!("Cover: {} bytes ({})", cover.data.len(), cover.kind.name());
        if let Some(out) = cover_path {
            fs::write(out, &cover.data)?;
            println!("Cover saved to {}", out);
        }
    }

    demux.close();
    Ok(())
}
