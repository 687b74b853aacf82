pub mod gradio_call_response;
