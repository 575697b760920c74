//! Transcoder invocation.

use std::process::Stdio;

use tokio::process::Command;

/// Program and argument list for the external transcoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscoderCommand {
    program: String,
    args: Vec<String>,
}

impl TranscoderCommand {
    /// ffmpeg reading any container on stdin and writing fragmented MP4 on
    /// stdout: video copied, audio transcoded to AAC.
    pub fn fragmented_mp4(program: impl Into<String>, log_level: &str) -> Self {
        let args = [
            "-hide_banner",
            "-loglevel",
            log_level,
            "-i",
            "pipe:0",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-movflags",
            "frag_keyframe+empty_moov+faststart",
            "-f",
            "mp4",
            "pipe:1",
        ];
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Arbitrary program that reads stdin and writes stdout.
    pub fn custom<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// All three standard streams piped; killed if the handle is dropped.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl From<&crate::config::RemuxConfig> for TranscoderCommand {
    fn from(config: &crate::config::RemuxConfig) -> Self {
        Self::fragmented_mp4(config.program.clone(), &config.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragmented_mp4_recipe() {
        let cmd = TranscoderCommand::fragmented_mp4("ffmpeg", "error");
        assert_eq!(cmd.program(), "ffmpeg");
        assert_eq!(
            cmd.args().join(" "),
            "-hide_banner -loglevel error -i pipe:0 -c:v copy -c:a aac \
             -movflags frag_keyframe+empty_moov+faststart -f mp4 pipe:1"
        );
    }

    #[test]
    fn built_from_config() {
        let mut config = crate::config::RemuxConfig::default();
        config.program = "/opt/ffmpeg/bin/ffmpeg".into();
        config.log_level = "warning".into();

        let cmd = TranscoderCommand::from(&config);
        assert_eq!(cmd.program(), "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(&cmd.args()[1..3], ["-loglevel", "warning"]);
    }
}
