// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Detect Options:
    --model, -m <MODEL>    Path to ONNX model file
    --source, -s <SOURCE>  Video file, stream URL, or webcam index [default: 0]
    --classes <CLASSES>    Path to class names file (one name per line)
    --conf <CONF>          Confidence threshold [default: 0.4]
    --score <SCORE>        Score threshold for suppression [default: 0.5]
    --iou <IOU>            IoU threshold for suppression [default: 0.4]
    --show                 Display annotated frames in a window
    --verbose              Show per-frame output

Examples:
    yolo-stream detect --model yolov4.onnx --classes coco.names --source video.mp4
    yolo-stream detect --model yolov4.onnx --source 0 --show
    yolo-stream detect -m yolov4.onnx -s rtsp://camera.local/stream --conf 0.5
    yolo-stream detect -m yolov4.onnx -s clip.mp4 --iou 0.6 --verbose false"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run detection on a video, stream, or webcam
    Detect(DetectArgs),
}

/// Arguments for the detect command.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Path to ONNX model file
    #[arg(short, long)]
    pub model: Option<String>,

    /// Video file, stream URL, or webcam index
    #[arg(short, long)]
    pub source: Option<String>,

    /// Path to class names file (one name per line)
    #[arg(long)]
    pub classes: Option<String>,

    /// Confidence threshold
    #[arg(long, default_value_t = 0.4)]
    pub conf: f32,

    /// Score threshold for suppression
    #[arg(long, default_value_t = 0.5)]
    pub score: f32,

    /// `IoU` threshold for suppression
    #[arg(long, default_value_t = 0.4)]
    pub iou: f32,

    /// Display annotated frames in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Show per-frame output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}
