use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use toneboard::audio::export::{ExportSettings, export_score};
use toneboard::audio::sink::CpalSink;
use toneboard::{
    NoteFrequencyTable, PlaybackSettings, Score, ScorePlayer, SharedSession, Timbre,
    ToneSynthesizer, UserSettings,
};

struct CliOptions {
    score_path: PathBuf,
    instrument: Option<Timbre>,
    octaves: Option<u8>,
    tempo: Option<f64>,
    export: Option<PathBuf>,
}

fn print_usage() {
    println!("Usage: toneboard <score.txt> [options]");
    println!();
    println!("Options:");
    println!("  -i, --instrument <piano|xylophone|videogame>");
    println!("  -o, --octaves <1..3>      piano octave used for playback");
    println!("  -t, --tempo <factor>      speed multiplier, > 1 speeds up");
    println!("  -e, --export <out.wav>    bounce to a WAV file instead of playing");
    println!("  -h, --help");
}

fn parse_args(args: &[String]) -> Result<Option<CliOptions>, String> {
    let mut score_path = None;
    let mut instrument = None;
    let mut octaves = None;
    let mut tempo = None;
    let mut export = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-i" | "--instrument" => {
                let value = iter.next().ok_or("missing instrument name")?;
                instrument =
                    Some(Timbre::from_name(value).ok_or(format!("unknown instrument {value:?}"))?);
            }
            "-o" | "--octaves" => {
                let value = iter.next().ok_or("missing octave count")?;
                let count: u8 = value
                    .parse()
                    .map_err(|_| format!("invalid octave count {value:?}"))?;
                if !(1..=3).contains(&count) {
                    return Err(format!("octave count out of range: {count}"));
                }
                octaves = Some(count);
            }
            "-t" | "--tempo" => {
                let value = iter.next().ok_or("missing tempo factor")?;
                let factor: f64 = value
                    .parse()
                    .map_err(|_| format!("invalid tempo factor {value:?}"))?;
                tempo = Some(factor);
            }
            "-e" | "--export" => {
                let value = iter.next().ok_or("missing export path")?;
                export = Some(PathBuf::from(value));
            }
            other if score_path.is_none() && !other.starts_with('-') => {
                score_path = Some(PathBuf::from(other));
            }
            other => return Err(format!("unexpected argument {other:?}")),
        }
    }

    let score_path = score_path.ok_or("missing score file")?;
    Ok(Some(CliOptions {
        score_path,
        instrument,
        octaves,
        tempo,
        export,
    }))
}

fn main() -> ExitCode {
    println!("=== Toneboard ===\n");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("ERROR: {message}\n");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let settings = match UserSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("WARNING: could not load settings ({e}), using defaults");
            UserSettings::default()
        }
    };

    let timbre = options
        .instrument
        .or_else(|| Timbre::from_index(settings.instrument))
        .unwrap_or(Timbre::Piano);
    let octave = options.octaves.unwrap_or(settings.octaves);
    let tempo_factor = options.tempo.unwrap_or(settings.tempo_factor);

    let score = match Score::load(&options.score_path, settings.clicks.piano) {
        Ok(score) => score,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!(
        "Score: {} ({} entries, {:.2}s at tempo {tempo_factor})",
        options.score_path.display(),
        score.len(),
        score.total_duration() / tempo_factor,
    );
    println!("Instrument: {} (octave {octave})\n", timbre.name());

    let synth = ToneSynthesizer::default();
    let notes = Arc::new(NoteFrequencyTable::standard());

    if let Some(export_path) = options.export {
        let export_settings = ExportSettings {
            timbre,
            octave,
            tempo_factor,
        };
        match export_score(&export_path, &score, &synth, &notes, &export_settings) {
            Ok(report) => {
                println!(
                    "Exported {} entries ({} audible, {:.2}s) to {}",
                    report.entries,
                    report.rendered,
                    report.duration_seconds,
                    export_path.display()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("ERROR: {e}");
                ExitCode::FAILURE
            }
        }
    } else {
        let sink = match CpalSink::new() {
            Ok(sink) => sink,
            Err(e) => {
                eprintln!("ERROR: {e}");
                return ExitCode::FAILURE;
            }
        };

        let session = SharedSession::new();
        let mut player = ScorePlayer::new(Arc::clone(&session), synth, notes, Box::new(sink));

        // Enter stops playback before the next entry.
        println!("Playing... press Enter to stop.\n");
        thread::spawn(move || {
            let mut line = String::new();
            let _ = std::io::stdin().read_line(&mut line);
            session.request_stop();
        });

        let playback = PlaybackSettings {
            timbre,
            tempo_factor,
            octave,
        };
        let result = player.play(&score, &playback, |index, entry, buffer| {
            if entry.is_rest() {
                println!("  {index:>3}  (rest)   {:.3}s", entry.duration);
            } else if buffer.is_some() {
                println!("  {index:>3}  {:<6} {:.3}s", entry.note, entry.duration);
            } else {
                println!("  {index:>3}  {:<6} (silent)", entry.note);
            }
        });

        match result {
            Ok(outcome) => {
                println!("\nPlayback {outcome:?}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("ERROR: {e}");
                ExitCode::FAILURE
            }
        }
    }
}
