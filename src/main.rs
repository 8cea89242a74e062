use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path as AxumPath, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    BoxError, Json, Router,
};
use futures::{Stream, TryStreamExt};
use legenda::adapters::{
    FfmpegTool, GoogleSpeechClient, HttpSpeechTransport, InMemoryVideoRepository, SystemFfmpeg,
};
use legenda::application::{PipelineService, PipelineSettings};
use legenda::config::Config;
use legenda::domain::video::Video;
use legenda::ports::repository::VideoRepository;
use serde_json::{json, Value};
use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{fs::File, io::BufWriter};
use tokio_util::io::StreamReader;

struct AppState {
    repo: InMemoryVideoRepository,
    config: Config,
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    let is_test: bool = env::var("IS_TEST")
        .unwrap_or_else(|_| String::from("true"))
        .parse()
        .unwrap_or(true);

    tracing_subscriber::fmt::init();

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    let state = Arc::new(AppState {
        repo: InMemoryVideoRepository::new(),
        config: config.clone(),
    });

    let mut router = Router::new()
        .route("/api/videos/upload", post(upload_video))
        .route("/api/videos/status/:id", get(video_status))
        .route("/api/videos/list", get(list_videos))
        .layer(DefaultBodyLimit::disable());

    if is_test {
        router = router.route("/", get(root));
    }

    let app = router.with_state(state);
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port))
        .await
        .expect("Failed to bind TCP listener");
    println!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}

/// Accepts a multipart upload (`video` file field, `titulo` text field),
/// stores the file, records the video and kicks off the pipeline.
async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let mut title: Option<String> = None;
    let mut stored_path: Option<PathBuf> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("titulo") => {
                title = field.text().await.ok();
            }
            // Only the `video` field carries the payload; stray file fields
            // are dropped.
            Some("video") => {
                let Some(file_name) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let extension = PathBuf::from(&file_name)
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                let target = PathBuf::from(&state.config.upload_dir).join(format!(
                    "{}{}",
                    chrono::Utc::now().timestamp_millis(),
                    extension
                ));
                if !path_is_valid(&target) {
                    return Err(bad_request("invalid upload path"));
                }
                tracing::info!(path = %target.display(), "saving new upload");
                stream_to_file(&target, field)
                    .await
                    .map_err(|(code, msg)| (code, Json(json!({ "error": msg }))))?;
                stored_path = Some(target);
            }
            _ => {}
        }
    }

    let Some(path) = stored_path else {
        return Err(bad_request("no file sent"));
    };

    let video = Video::new(title.unwrap_or_else(|| String::from("untitled")), path);
    let id = video.id.clone();
    state
        .repo
        .create_video(&video)
        .await
        .map_err(internal_error)?;

    spawn_pipeline(&state, id.clone());

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "video uploaded", "id": id })),
    ))
}

/// Builds the pipeline from config and runs it as a detached task; the
/// record's status is how callers observe the outcome.
fn spawn_pipeline(state: &Arc<AppState>, video_id: String) {
    let config = &state.config;
    let media = FfmpegTool::new(SystemFfmpeg::new(
        config.ffmpeg_path.clone(),
        config.ffprobe_path.clone(),
    ));
    let speech = GoogleSpeechClient::new(
        HttpSpeechTransport::new(config.speech_endpoint.clone(), config.speech_api_key.clone()),
        config.language_code.clone(),
    );
    let pipeline = PipelineService::new(
        media,
        speech,
        state.repo.clone(),
        PipelineSettings {
            video_segment_seconds: config.video_segment_seconds,
            audio_chunk_seconds: config.audio_chunk_seconds,
        },
    );
    tokio::spawn(async move {
        if let Err(e) = pipeline.run(&video_id).await {
            tracing::error!(video = %video_id, error = %e, "pipeline run failed");
        }
    });
}

async fn video_status(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let video = state.repo.get_video(&id).await.map_err(internal_error)?;
    match video {
        Some(video) => Ok(Json(json!({ "status": video.status }))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "video not found" })),
        )),
    }
}

async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let videos = state.repo.list_videos().await.map_err(internal_error)?;
    let summaries: Vec<Value> = videos
        .iter()
        .map(|v| {
            json!({
                "id": v.id,
                "titulo": v.title,
                "status": v.status,
                "createdAt": v.created_at,
            })
        })
        .collect();
    Ok(Json(Value::Array(summaries)))
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(
    e: Box<dyn std::error::Error + Send + Sync>,
) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

// Save a `Stream` to a file
async fn stream_to_file<S, E>(path: &PathBuf, stream: S) -> Result<(), (StatusCode, String)>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    async {
        let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
        let body_reader = StreamReader::new(body_with_io_error);
        futures::pin_mut!(body_reader);

        let mut file = BufWriter::new(File::create(path).await?);
        tokio::io::copy(&mut body_reader, &mut file).await?;

        Ok::<_, io::Error>(())
    }
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
}

fn path_is_valid(path: &PathBuf) -> bool {
    for component in path.components() {
        if matches!(component, std::path::Component::ParentDir) {
            tracing::warn!(path = %path.display(), "rejected path with parent component");
            return false;
        }
    }
    true
}

async fn root(State(state): State<Arc<AppState>>) -> Html<String> {
    let rows = match state.repo.list_videos().await {
        Ok(videos) => videos
            .iter()
            .map(|v| format!("<li>{} — {}</li>", v.title, v.status))
            .collect::<String>(),
        Err(_) => String::from("<li>Error listing videos</li>"),
    };

    Html(format!(
        r#"
        <!doctype html>
        <html>
            <head>
                <title>Upload a video!</title>
            </head>
            <body>
                <h1>Videos:</h1>
                <ul>{}</ul>
                <form action="/api/videos/upload" method="post" enctype="multipart/form-data">
                    <div>
                        <label>
                            Title:
                            <input type="text" name="titulo">
                        </label>
                    </div>
                    <div>
                        <label>
                            Upload file:
                            <input type="file" name="video">
                        </label>
                    </div>
                    <div>
                        <input type="submit" value="Upload">
                    </div>
                </form>
            </body>
        </html>
        "#,
        rows
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stream_to_file() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");

        type E = std::io::Error;

        let test_data = "Hello, world!";
        let mock_stream = stream::iter(vec![Ok::<bytes::Bytes, E>(Bytes::from(test_data))]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_ok());

        let file_contents = fs::read_to_string(file_path).unwrap();
        assert_eq!(file_contents, test_data);
    }

    #[tokio::test]
    async fn test_stream_to_file_error() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test_file.txt");

        let mock_stream = stream::iter(vec![Err("Test error")]);

        let result = stream_to_file(&file_path, mock_stream).await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err(),
            (StatusCode::INTERNAL_SERVER_ERROR, "Test error".to_string())
        );
    }

    #[test]
    fn test_valid_path() {
        let valid_path = PathBuf::from("uploads/video.mp4");
        assert!(path_is_valid(&valid_path));
    }

    #[test]
    fn test_invalid_path_with_parent() {
        let invalid_path = PathBuf::from("../invalid_directory/video.mp4");
        assert!(!path_is_valid(&invalid_path));
    }

    mod upload {
        use super::super::{upload_video, AppState};
        use axum::body::Body;
        use axum::http::{header, Request, StatusCode};
        use axum::routing::post;
        use axum::Router;
        use legenda::adapters::InMemoryVideoRepository;
        use legenda::config::Config;
        use std::fs;
        use std::sync::Arc;
        use tempfile::tempdir;
        use tower::ServiceExt;

        fn test_router(upload_dir: &std::path::Path) -> Router {
            let state = Arc::new(AppState {
                repo: InMemoryVideoRepository::new(),
                config: Config {
                    addr: String::from("127.0.0.1"),
                    port: String::from("0"),
                    upload_dir: upload_dir.to_string_lossy().into_owned(),
                    speech_endpoint: String::from("http://127.0.0.1:1/recognize"),
                    speech_api_key: String::new(),
                    language_code: String::from("pt-BR"),
                    video_segment_seconds: 60.0,
                    audio_chunk_seconds: 59.0,
                    ffmpeg_path: String::from("ffmpeg"),
                    ffprobe_path: String::from("ffprobe"),
                },
            });
            Router::new()
                .route("/api/videos/upload", post(upload_video))
                .with_state(state)
        }

        fn multipart_upload(file_field: &str) -> Request<Body> {
            let boundary = "zzxxccvv";
            let body = format!(
                "--{b}\r\n\
                 Content-Disposition: form-data; name=\"titulo\"\r\n\r\n\
                 aula de teste\r\n\
                 --{b}\r\n\
                 Content-Disposition: form-data; name=\"{f}\"; filename=\"aula.mp4\"\r\n\
                 Content-Type: video/mp4\r\n\r\n\
                 fake mp4 bytes\r\n\
                 --{b}--\r\n",
                b = boundary,
                f = file_field
            );
            Request::builder()
                .method("POST")
                .uri("/api/videos/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap()
        }

        #[tokio::test]
        async fn accepts_the_video_field() {
            let dir = tempdir().unwrap();
            let app = test_router(dir.path());

            let response = app.oneshot(multipart_upload("video")).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        }

        #[tokio::test]
        async fn ignores_file_fields_not_named_video() {
            let dir = tempdir().unwrap();
            let app = test_router(dir.path());

            let response = app.oneshot(multipart_upload("anexo")).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        }
    }
}
