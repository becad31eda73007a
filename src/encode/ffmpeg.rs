use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::encoder::{
    Codec, Container, EncoderConfig, MediaBlob, MediaPayload, VideoEncoder,
};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::RasterFrame;

/// Options for [`FfmpegEncoder`].
#[derive(Clone, Debug)]
pub struct FfmpegEncoderOpts {
    /// Directory the in-progress and finished files are written to.
    pub work_dir: PathBuf,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegEncoderOpts {
    /// Write into `work_dir` over a black background.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Encoder that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Output goes to a `.partial` file until `finish` succeeds, when it is renamed and returned as
/// a file-backed [`MediaBlob`]. `abort`, a failed `finish`, and drop all kill the process and
/// delete the partial file.
pub struct FfmpegEncoder {
    opts: FfmpegEncoderOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<EncoderConfig>,
    partial: Option<PathBuf>,
}

impl FfmpegEncoder {
    /// Create an encoder writing into `opts.work_dir`.
    pub fn new(opts: FfmpegEncoderOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            partial: None,
        }
    }

    fn cleanup(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        if let Some(path) = self.partial.take()
            && path.exists()
            && let Err(e) = std::fs::remove_file(&path)
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output");
        }
        self.cfg = None;
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn start(&mut self, cfg: &EncoderConfig) -> ReelResult<()> {
        if cfg.fps == 0 {
            return Err(ReelError::encoding("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::encoding(
                "ffmpeg encoder width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::encoding(
                "ffmpeg encoder width/height must be even (required for yuv420p output)",
            ));
        }
        if !cfg.codec.fits(cfg.container) {
            return Err(ReelError::encoding(format!(
                "{:?} cannot be stored in {:?}",
                cfg.codec, cfg.container
            )));
        }

        std::fs::create_dir_all(&self.opts.work_dir).map_err(|e| {
            ReelError::encoding(format!(
                "failed to create output directory '{}': {e}",
                self.opts.work_dir.display()
            ))
        })?;

        if !is_ffmpeg_on_path() {
            return Err(ReelError::encoding(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let partial = self.opts.work_dir.join(format!(
            "{}.{}.partial",
            unique_stem(),
            cfg.container.extension()
        ));

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args(ffmpeg_args(cfg))
            .arg(&partial);

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::encoding(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            codec = ?cfg.codec,
            container = ?cfg.container,
            bitrate = cfg.bitrate_bps(),
            path = %partial.display(),
            "spawned ffmpeg"
        );

        self.scratch = vec![0u8; cfg.frame_len()];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg.clone());
        self.partial = Some(partial);
        Ok(())
    }

    fn add_frame(&mut self, frame: &RasterFrame) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encoding("ffmpeg encoder not started"))?;
        cfg.check_frame(frame)?;

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(
                &mut self.scratch,
                &frame.data,
                self.opts.bg_rgba,
            )?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encoding("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelError::encoding(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn finish(&mut self) -> ReelResult<MediaBlob> {
        let res = self.wait_for_exit();
        if res.is_err() {
            self.cleanup();
        }
        res
    }

    fn abort(&mut self) {
        self.cleanup();
    }
}

impl FfmpegEncoder {
    fn wait_for_exit(&mut self) -> ReelResult<MediaBlob> {
        drop(self.stdin.take());
        let cfg = self
            .cfg
            .clone()
            .ok_or_else(|| ReelError::encoding("ffmpeg encoder not started"))?;
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encoding("ffmpeg encoder not started"))?;

        let status = child.wait().map_err(|e| {
            ReelError::encoding(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encoding("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encoding(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::encoding(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let partial = self
            .partial
            .clone()
            .ok_or_else(|| ReelError::encoding("ffmpeg encoder lost its output path"))?;
        let finished = finished_path(&partial);
        std::fs::rename(&partial, &finished).map_err(|e| {
            ReelError::encoding(format!(
                "failed to move '{}' into place: {e}",
                partial.display()
            ))
        })?;
        self.partial = None;
        self.cfg = None;

        Ok(MediaBlob {
            mime_type: cfg.container.mime_type().to_string(),
            payload: MediaPayload::File(finished),
        })
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.child.is_some() || self.partial.is_some() {
            self.cleanup();
        }
    }
}

/// Every `ffmpeg` argument except the output path.
pub(crate) fn ffmpeg_args(cfg: &EncoderConfig) -> Vec<String> {
    // Input: raw RGBA8 frames, already flattened to opaque.
    let mut args: Vec<String> = [
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    args.push(format!("{}x{}", cfg.width, cfg.height));
    args.push("-r".to_string());
    args.push(cfg.fps.to_string());
    args.extend(["-i", "pipe:0", "-an", "-c:v"].map(String::from));
    args.push(codec_encoder(cfg.codec).to_string());
    if cfg.codec == Codec::H265 && cfg.container == Container::Mp4 {
        args.extend(["-tag:v", "hvc1"].map(String::from));
    }
    args.extend(["-pix_fmt", "yuv420p", "-b:v"].map(String::from));
    args.push(cfg.bitrate_bps().max(1).to_string());
    if cfg.container == Container::Mp4 {
        args.extend(["-movflags", "+faststart"].map(String::from));
    }
    // The output name ends in `.partial`, so the muxer is named explicitly.
    args.push("-f".to_string());
    args.push(cfg.container.extension().to_string());
    args
}

fn codec_encoder(codec: Codec) -> &'static str {
    match codec {
        Codec::H264 => "libx264",
        Codec::H265 => "libx265",
        Codec::Vp9 => "libvpx-vp9",
        Codec::Av1 => "libaom-av1",
    }
}

fn unique_stem() -> String {
    format!(
        "fractalreel_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    )
}

/// `name.mp4.partial` -> `name.mp4`.
pub(crate) fn finished_path(partial: &Path) -> PathBuf {
    partial.with_extension("")
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::encoding(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        for ((dc, &sc), &bc) in d.iter_mut().zip(s).zip(&bg) {
            *dc = (u16::from(sc) + mul_div255_u16(bc, inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
