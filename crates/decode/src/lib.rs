use std::fs::File;
use std::path::Path;

use star_transport::{AudioBuffer, resample_audio};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decode an audio file into interleaved f32 samples at its native rate.
pub fn decode_file(path: &Path) -> anyhow::Result<AudioBuffer> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("cannot open '{}': {e}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("no default track in '{}'", path.display()))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2) as u16;
    let track_id = track.id;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt packet in a long loop is not worth dropping the whole track
            Err(SymphoniaError::DecodeError(e)) => {
                log::debug!("skipping undecodable packet in '{}': {e}", path.display());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    Ok(AudioBuffer {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode the background track and bring it to the output device rate.
pub fn load_background_track(path: &Path, target_sample_rate: u32) -> anyhow::Result<AudioBuffer> {
    let decoded = decode_file(path)?;
    if decoded.is_empty() {
        anyhow::bail!("background track '{}' contains no audio", path.display());
    }

    log::debug!(
        "decoded background track '{}': {:.1}s, {} Hz, {} ch",
        path.display(),
        decoded.duration_seconds(),
        decoded.sample_rate,
        decoded.channels
    );

    resample_audio(&decoded, target_sample_rate)
}
