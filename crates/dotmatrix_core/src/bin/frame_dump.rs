use std::path::PathBuf;

use dotmatrix_core::{Machine, Model, SCREEN_HEIGHT, SCREEN_WIDTH};

const SHADES: [u8; 4] = [0xFF, 0xAA, 0x55, 0x00];

fn usage() -> ! {
    eprintln!("Usage: frame_dump <rom_path> <out_gray8_path> [frames]");
    std::process::exit(2);
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let rom_path: PathBuf = args.next().map(PathBuf::from).unwrap_or_else(|| usage());
    let out_path: PathBuf = args.next().map(PathBuf::from).unwrap_or_else(|| usage());
    let frames: u32 = args
        .next()
        .unwrap_or_else(|| "120".to_string())
        .parse()
        .unwrap_or_else(|_| {
            eprintln!("Invalid frame count; expected an integer.");
            std::process::exit(2);
        });

    let rom = std::fs::read(&rom_path).unwrap_or_else(|err| {
        eprintln!("Failed to read ROM '{}': {err}", rom_path.display());
        std::process::exit(1);
    });

    let mut machine = Machine::new(Model::Dmg);
    machine.load_rom(rom);

    for _ in 0..frames {
        if let Err(err) = machine.step_frame() {
            eprintln!("Emulation fault: {err}");
            std::process::exit(1);
        }
    }

    // One grayscale byte per pixel, row-major.
    let buffer: Vec<u8> = machine
        .frame()
        .iter()
        .map(|&shade| SHADES[shade as usize & 3])
        .collect();

    std::fs::write(&out_path, &buffer).unwrap_or_else(|err| {
        eprintln!("Failed to write '{}': {err}", out_path.display());
        std::process::exit(1);
    });

    println!(
        "Wrote {} bytes ({}x{} gray8) after {} frames to '{}'",
        buffer.len(),
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        frames,
        out_path.display()
    );
}
