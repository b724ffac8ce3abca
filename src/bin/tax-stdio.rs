use bench_runner::target;
use std::io::{ self, Read, Write };

const ENGINE: &str = "gojinn-rust";

// One envelope in on stdin, one envelope out on stdout
fn main() -> io::Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let response = target::handle_envelope(&input, ENGINE);
    let encoded = serde_json::to_string(&response).map_err(io::Error::other)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(encoded.as_bytes())?;
    stdout.flush()
}
