pub mod gradio;
