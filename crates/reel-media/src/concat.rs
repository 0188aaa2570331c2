//! Concat graph construction.
//!
//! Builds the input references, filter expression and stream maps that
//! merge N normalized clips (with possibly-mixed audio presence) into
//! one file, plus the audio-only variant used for narration segments.
//! Construction is pure; execution goes through `FfmpegRunner`.

use std::path::{Path, PathBuf};

/// One concat input with its known audio presence.
#[derive(Debug, Clone)]
pub struct ConcatInput {
    pub path: PathBuf,
    pub has_audio: bool,
}

impl ConcatInput {
    pub fn new(path: impl Into<PathBuf>, has_audio: bool) -> Self {
        Self {
            path: path.into(),
            has_audio,
        }
    }
}

/// Filter-graph specification for concatenating clips.
#[derive(Debug, Clone)]
pub struct ConcatGraph {
    inputs: Vec<ConcatInput>,
}

impl ConcatGraph {
    pub fn new(inputs: Vec<ConcatInput>) -> Self {
        Self { inputs }
    }

    fn audio_count(&self) -> usize {
        self.inputs.iter().filter(|i| i.has_audio).count()
    }

    /// The concat filter expression.
    ///
    /// The video chain references every input. The audio chain
    /// references exactly the inputs that carry audio, with its `n`
    /// equal to that count; when no input carries audio the chain is
    /// omitted entirely so the graph never declares a zero-stream
    /// concat.
    pub fn filter_expression(&self) -> String {
        let n = self.inputs.len();
        let a = self.audio_count();

        let video_refs: String = (0..n).map(|i| format!("[{}:v:0]", i)).collect();
        let mut filter = format!("{}concat=n={}:v=1:a=0[v]", video_refs, n);

        if a > 0 {
            let audio_refs: String = self
                .inputs
                .iter()
                .enumerate()
                .filter(|(_, input)| input.has_audio)
                .map(|(i, _)| format!("[{}:a:0]", i))
                .collect();
            filter.push_str(&format!(";{}concat=n={}:v=0:a=1[a]", audio_refs, a));
        }

        filter
    }

    /// Build the full argument vector for the concat invocation.
    pub fn build_args(&self, output: &Path) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-hide_banner".to_string()];

        for input in &self.inputs {
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.push("-filter_complex".to_string());
        args.push(self.filter_expression());

        args.push("-map".to_string());
        args.push("[v]".to_string());
        if self.audio_count() > 0 {
            args.push("-map".to_string());
            args.push("[a]".to_string());
        }

        // Filter outputs always need an encode on the video side.
        args.push("-c:v".to_string());
        args.push("libx264".to_string());
        args.push("-preset".to_string());
        args.push("veryfast".to_string());

        args.push(output.to_string_lossy().to_string());
        args
    }
}

/// Argument vector for concatenating audio-only segments in order.
pub fn audio_concat_args(inputs: &[PathBuf], output: &Path) -> Vec<String> {
    let mut args = vec!["-y".to_string(), "-hide_banner".to_string()];

    for input in inputs {
        args.push("-i".to_string());
        args.push(input.to_string_lossy().to_string());
    }

    let refs: String = (0..inputs.len()).map(|i| format!("[{}:a:0]", i)).collect();
    args.push("-filter_complex".to_string());
    args.push(format!("{}concat=n={}:v=0:a=1[a]", refs, inputs.len()));

    args.push("-map".to_string());
    args.push("[a]".to_string());

    args.push(output.to_string_lossy().to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(audio: &[bool]) -> Vec<ConcatInput> {
        audio
            .iter()
            .enumerate()
            .map(|(i, a)| ConcatInput::new(format!("clip{}.mp4", i), *a))
            .collect()
    }

    #[test]
    fn test_all_silent_omits_audio_chain() {
        let graph = ConcatGraph::new(inputs(&[false, false, false]));
        let filter = graph.filter_expression();
        assert_eq!(filter, "[0:v:0][1:v:0][2:v:0]concat=n=3:v=1:a=0[v]");

        let args = graph.build_args(Path::new("out.mp4"));
        assert!(!args.contains(&"[a]".to_string()));
    }

    #[test]
    fn test_all_audio() {
        let graph = ConcatGraph::new(inputs(&[true, true]));
        let filter = graph.filter_expression();
        assert_eq!(
            filter,
            "[0:v:0][1:v:0]concat=n=2:v=1:a=0[v];[0:a:0][1:a:0]concat=n=2:v=0:a=1[a]"
        );
    }

    #[test]
    fn test_mixed_audio_references_only_audio_clips() {
        let graph = ConcatGraph::new(inputs(&[true, false, true]));
        let filter = graph.filter_expression();
        // Audio chain references inputs 0 and 2 only, n equals the audio count.
        assert!(filter.contains("[0:a:0][2:a:0]concat=n=2:v=0:a=1[a]"));
        assert!(!filter.contains("[1:a:0]"));

        let args = graph.build_args(Path::new("out.mp4"));
        assert!(args.contains(&"[a]".to_string()));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 3);
    }

    #[test]
    fn test_audio_concat_args_preserve_order() {
        let paths = vec![PathBuf::from("s0.mp3"), PathBuf::from("s1.mp3")];
        let args = audio_concat_args(&paths, Path::new("tts.mp3"));

        let first = args.iter().position(|a| a == "s0.mp3").unwrap();
        let second = args.iter().position(|a| a == "s1.mp3").unwrap();
        assert!(first < second);
        assert!(args.contains(&"[0:a:0][1:a:0]concat=n=2:v=0:a=1[a]".to_string()));
    }
}
