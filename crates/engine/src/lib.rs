use basedrop::{Collector, Handle, Shared};
use cpal::{
    FromSample, SizedSample,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use star_synth::Mixer;
use star_transport::{AudioBuffer, Command, Status};

type SharedTrack = Shared<AudioBuffer>;

const COMMAND_CAPACITY: usize = 256;
const STATUS_CAPACITY: usize = 256;
// Scratch space for non-f32 devices; larger callbacks are rendered in pieces
const SCRATCH_FRAMES: usize = 4096;

/// Initial levels for a freshly opened stream.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub master_gain: f32,
    pub track_volume: f32,
}

/// Control-side handle to a running output stream. Dropping it stops the
/// stream and releases the device.
pub struct AudioEngineHandle {
    // Dropped first so the audio thread lets go of its buffers before the
    // collector goes away
    _stream: cpal::Stream,
    pub commands: rtrb::Producer<Command>,
    pub status: rtrb::Consumer<Status>,
    pub tracks: rtrb::Producer<SharedTrack>,
    pub collector: Collector,
    pub handle: Handle,
    sample_rate: u32,
}

impl AudioEngineHandle {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn send(&mut self, command: Command) -> anyhow::Result<()> {
        self.commands
            .push(command)
            .map_err(|_| anyhow::anyhow!("engine command queue is full"))
    }

    /// Hand a background track to the audio thread. The buffer must already
    /// be at the device sample rate.
    pub fn set_track(&mut self, buffer: AudioBuffer) -> anyhow::Result<()> {
        let shared = Shared::new(&self.handle, buffer);
        self.tracks
            .push(shared)
            .map_err(|_| anyhow::anyhow!("engine track queue is full"))
    }

    /// Drain status messages and free buffers the audio thread let go of.
    pub fn poll(&mut self) -> Vec<Status> {
        let mut statuses = Vec::new();
        while let Ok(status) = self.status.pop() {
            statuses.push(status);
        }
        self.collector.collect();
        statuses
    }
}

pub fn start(config: EngineConfig) -> anyhow::Result<AudioEngineHandle> {
    let collector = Collector::new();
    let handle = collector.handle();

    let (command_tx, command_rx) = rtrb::RingBuffer::<Command>::new(COMMAND_CAPACITY);
    let (status_tx, status_rx) = rtrb::RingBuffer::<Status>::new(STATUS_CAPACITY);
    let (tracks_tx, tracks_rx) = rtrb::RingBuffer::<SharedTrack>::new(4);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no output device found"))?;

    let supported = device.default_output_config()?;
    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();
    let sample_rate = stream_config.sample_rate.0;

    log::info!(
        "opening output device {:?}: {} Hz, {} ch, {sample_format}",
        device.name().unwrap_or_default(),
        sample_rate,
        stream_config.channels
    );

    let mixer = Mixer::new(sample_rate, config.master_gain, config.track_volume);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &stream_config, mixer, command_rx, tracks_rx, status_tx)?
        }
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &stream_config, mixer, command_rx, tracks_rx, status_tx)?
        }
        cpal::SampleFormat::U16 => {
            build_stream::<u16>(&device, &stream_config, mixer, command_rx, tracks_rx, status_tx)?
        }
        sample_format => anyhow::bail!("unsupported sample format '{sample_format}'"),
    };

    stream.play()?;

    Ok(AudioEngineHandle {
        _stream: stream,
        commands: command_tx,
        status: status_rx,
        tracks: tracks_tx,
        collector,
        handle,
        sample_rate,
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: Mixer<SharedTrack>,
    mut command_rx: rtrb::Consumer<Command>,
    mut tracks_rx: rtrb::Consumer<SharedTrack>,
    mut status_tx: rtrb::Producer<Status>,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut scratch = vec![0.0f32; SCRATCH_FRAMES * channels];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // The replaced buffer is a Shared, so dropping it here only
            // queues it for the collector on the control thread
            while let Ok(track) = tracks_rx.pop() {
                let _previous = mixer.set_track(track);
            }

            while let Ok(command) = command_rx.pop() {
                mixer.apply(command);
            }

            for chunk in data.chunks_mut(scratch.len()) {
                let block = &mut scratch[..chunk.len()];
                mixer.process(block, channels, |id| {
                    let _ = status_tx.push(Status::VoiceFinished(id));
                });
                for (out, sample) in chunk.iter_mut().zip(block.iter()) {
                    *out = T::from_sample(*sample);
                }
            }
        },
        |err| log::error!("output stream error: {err}"),
        None,
    )?;

    Ok(stream)
}
