use iced::{
    time,
    widget::{button, column, container, image, scrollable, stack, text, Column, Container, Row},
    Alignment, Color, Element, Length, Subscription, Task, Theme,
};
use std::sync::Arc;
use std::time::Duration;
use trafficcore::api::{AnalysisStatus, Artifact, StatisticsPayload, Visualization};
use trafficcore::display;
use trafficcore::download::{DownloadManager, DownloadOutcome};
use trafficcore::telemetry::MetricsRecorder;
use trafficcore::ApiClient;

const BASE_URL: &str = "http://127.0.0.1:3015";
const POLL_INTERVAL: Duration = Duration::from_secs(2);
const RESET_DELAY: Duration = Duration::from_secs(3);
const NOTICE_TIMEOUT: Duration = Duration::from_secs(8);
const DOWNLOAD_DIR: &str = "downloads";

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Dashboard::boot, Dashboard::update, Dashboard::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Dashboard) -> String {
    "Анализ дорожного трафика".into()
}

fn application_subscription(state: &Dashboard) -> Subscription<Message> {
    if state.phase == JobPhase::Running {
        time::every(POLL_INTERVAL).map(|_| Message::PollTick)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobPhase {
    Idle,
    Running,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug)]
struct Dashboard {
    client: ApiClient,
    downloads: DownloadManager,
    phase: JobPhase,
    status_line: String,
    panel: Option<Visualization>,
    report: Option<String>,
    heatmap: Option<image::Handle>,
    infographic: Option<image::Handle>,
    speed_chart: Option<image::Handle>,
    stats: Option<StatisticsPayload>,
    panel_error: Option<(Visualization, String)>,
    notice: Option<Notice>,
    notice_seq: u64,
}

#[derive(Debug, Clone)]
struct Notice {
    id: u64,
    text: String,
    // filename + direct URL for the manual-download action
    fallback: Option<(String, String)>,
}

#[derive(Debug, Clone)]
enum Message {
    SessionOpened(Result<(), String>),
    StartPressed,
    Started(Result<(), String>),
    PollTick,
    StatusFetched(Result<AnalysisStatus, String>),
    ReportFetched(Result<String, String>),
    PanelSelected(Visualization),
    ImageFetched(Visualization, Result<Vec<u8>, String>),
    StatsFetched(Result<StatisticsPayload, String>),
    DownloadPressed(Artifact),
    DownloadFinished(DownloadOutcome),
    OpenFallbackLink(String),
    NoticeExpired(u64),
    NoticeClosed,
    ResetToIdle,
}

const IDLE_PROMPT: &str = "Нажмите, чтобы запустить анализ";

impl Dashboard {
    fn boot() -> (Self, Task<Message>) {
        let client = ApiClient::new(BASE_URL).expect("building api client");
        let metrics = Arc::new(MetricsRecorder::new());
        let downloads = DownloadManager::new(client.clone(), DOWNLOAD_DIR, metrics);
        let session_client = client.clone();
        (
            Dashboard {
                client,
                downloads,
                phase: JobPhase::Idle,
                status_line: IDLE_PROMPT.into(),
                panel: None,
                report: None,
                heatmap: None,
                infographic: None,
                speed_chart: None,
                stats: None,
                panel_error: None,
                notice: None,
                notice_seq: 0,
            },
            Task::perform(
                async move {
                    session_client
                        .open_session()
                        .await
                        .map_err(|err| err.user_message())
                },
                Message::SessionOpened,
            ),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::SessionOpened(Ok(())) => Task::none(),
            Message::SessionOpened(Err(err)) => {
                state.status_line = err;
                Task::none()
            }
            Message::StartPressed => {
                if state.phase != JobPhase::Idle {
                    return Task::none();
                }
                state.phase = JobPhase::Running;
                state.status_line = "Анализ запущен, ожидайте...".into();
                state.clear_results();
                let client = state.client.clone();
                Task::perform(
                    async move {
                        client
                            .open_session()
                            .await
                            .map_err(|err| display::start_failure_text(&err))?;
                        client
                            .start_analysis()
                            .await
                            .map(|_| ())
                            .map_err(|err| display::start_failure_text(&err))
                    },
                    Message::Started,
                )
            }
            Message::Started(Ok(())) => Task::none(),
            Message::Started(Err(text)) => state.fail(text),
            Message::PollTick => {
                if state.phase != JobPhase::Running {
                    return Task::none();
                }
                let client = state.client.clone();
                Task::perform(
                    async move { client.fetch_status().await.map_err(|err| err.user_message()) },
                    Message::StatusFetched,
                )
            }
            Message::StatusFetched(result) => {
                // In-flight samples may land after a terminal transition;
                // only the Running phase accepts them, so the move to result
                // loading happens exactly once per run.
                if state.phase != JobPhase::Running {
                    return Task::none();
                }
                match result {
                    Ok(status) => {
                        if let Some(message) = status.error {
                            state.fail(message)
                        } else if status.done {
                            state.phase = JobPhase::Loading;
                            state.status_line = "Анализ завершен, загрузка результатов...".into();
                            state.panel = Some(Visualization::Heatmap);
                            let client = state.client.clone();
                            Task::batch(vec![
                                Task::perform(
                                    async move {
                                        client
                                            .fetch_report()
                                            .await
                                            .map_err(|err| err.user_message())
                                    },
                                    Message::ReportFetched,
                                ),
                                state.fetch_panel(Visualization::Heatmap),
                            ])
                        } else {
                            Task::none()
                        }
                    }
                    Err(text) => state.fail(text),
                }
            }
            Message::ReportFetched(result) => {
                state.report = Some(result.unwrap_or_else(|err| {
                    log::warn!("report fetch failed: {err}");
                    display::REPORT_PLACEHOLDER.to_string()
                }));
                if state.phase == JobPhase::Loading {
                    state.phase = JobPhase::Ready;
                    state.status_line = "Результаты готовы".into();
                }
                Task::none()
            }
            Message::PanelSelected(panel) => {
                state.panel = Some(panel);
                state.panel_error = None;
                if state.panel_cached(panel) {
                    Task::none()
                } else {
                    state.fetch_panel(panel)
                }
            }
            Message::ImageFetched(panel, Ok(bytes)) => {
                let handle = image::Handle::from_bytes(bytes);
                match panel {
                    Visualization::Heatmap => state.heatmap = Some(handle),
                    Visualization::Infographic => state.infographic = Some(handle),
                    Visualization::SpeedDistribution => state.speed_chart = Some(handle),
                    Visualization::Stats => {}
                }
                Task::none()
            }
            Message::ImageFetched(panel, Err(text)) => {
                state.panel_error = Some((panel, text));
                Task::none()
            }
            Message::StatsFetched(Ok(stats)) => {
                state.stats = Some(stats);
                Task::none()
            }
            Message::StatsFetched(Err(text)) => {
                state.panel_error = Some((Visualization::Stats, text));
                Task::none()
            }
            Message::DownloadPressed(artifact) => {
                let downloads = state.downloads.clone();
                Task::perform(
                    async move { downloads.download(artifact).await },
                    Message::DownloadFinished,
                )
            }
            Message::DownloadFinished(DownloadOutcome::Saved { path }) => {
                state.show_notice(format!("Файл сохранен: {}", path.display()), None)
            }
            Message::DownloadFinished(DownloadOutcome::Fallback {
                url,
                filename,
                reason,
            }) => {
                let text = format!("Не удалось скачать {filename}: {reason}");
                state.show_notice(text, Some((filename, url)))
            }
            Message::OpenFallbackLink(url) => {
                if let Err(err) = open::that(&url) {
                    log::warn!("opening {url} failed: {err}");
                }
                Task::none()
            }
            Message::NoticeExpired(id) => {
                if state.notice.as_ref().map(|notice| notice.id) == Some(id) {
                    state.notice = None;
                }
                Task::none()
            }
            Message::NoticeClosed => {
                state.notice = None;
                Task::none()
            }
            Message::ResetToIdle => {
                if state.phase == JobPhase::Failed {
                    state.phase = JobPhase::Idle;
                    state.status_line = IDLE_PROMPT.into();
                }
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let start_button = button(text("Запустить анализ").size(18))
            .padding(12)
            .on_press_maybe((state.phase == JobPhase::Idle).then_some(Message::StartPressed));

        let mut layout = column![
            text("Анализ дорожного трафика").size(30),
            start_button,
            text(&state.status_line).size(16),
        ]
        .spacing(12)
        .padding(20);

        if state.phase == JobPhase::Running {
            layout = layout.push(text("Идет обработка данных...").size(14));
        }

        if matches!(state.phase, JobPhase::Loading | JobPhase::Ready) {
            let switcher = Visualization::ALL
                .iter()
                .fold(Row::new().spacing(8), |switcher, panel| {
                    switcher.push(
                        button(text(panel.title()).size(14)).padding(8).on_press_maybe(
                            (state.panel != Some(*panel))
                                .then_some(Message::PanelSelected(*panel)),
                        ),
                    )
                });

            let downloads_row = Artifact::ALL
                .iter()
                .fold(Row::new().spacing(8), |downloads, artifact| {
                    downloads.push(
                        button(text(artifact.title()).size(14))
                            .padding(8)
                            .on_press(Message::DownloadPressed(*artifact)),
                    )
                });

            let report_block = scrollable(
                text(state.report.as_deref().unwrap_or("Загрузка отчета...")).size(13),
            )
            .height(Length::Fixed(160.0));

            layout = layout
                .push(text("Результаты").size(22))
                .push(switcher)
                .push(
                    Container::new(panel_view(state))
                        .padding(8)
                        .width(Length::Fill),
                )
                .push(text("Текстовый отчет").size(18))
                .push(report_block)
                .push(text("Скачать результаты").size(18))
                .push(downloads_row);
        }

        let base = Container::new(scrollable(layout))
            .width(Length::Fill)
            .height(Length::Fill);

        match &state.notice {
            Some(notice) => stack![base, notice_view(notice)].into(),
            None => base.into(),
        }
    }

    fn fail(&mut self, text: String) -> Task<Message> {
        self.phase = JobPhase::Failed;
        self.status_line = text.clone();
        let notice = self.show_notice(text, None);
        let reset = Task::perform(async { tokio::time::sleep(RESET_DELAY).await }, |_| {
            Message::ResetToIdle
        });
        Task::batch(vec![notice, reset])
    }

    // Acquire-on-show: a new notice supersedes the current one, and only the
    // expiry carrying the live id may dismiss it.
    fn show_notice(&mut self, text: String, fallback: Option<(String, String)>) -> Task<Message> {
        self.notice_seq += 1;
        let id = self.notice_seq;
        self.notice = Some(Notice { id, text, fallback });
        Task::perform(
            async { tokio::time::sleep(NOTICE_TIMEOUT).await },
            move |_| Message::NoticeExpired(id),
        )
    }

    fn clear_results(&mut self) {
        self.panel = None;
        self.report = None;
        self.heatmap = None;
        self.infographic = None;
        self.speed_chart = None;
        self.stats = None;
        self.panel_error = None;
    }

    fn panel_cached(&self, panel: Visualization) -> bool {
        match panel {
            Visualization::Heatmap => self.heatmap.is_some(),
            Visualization::Infographic => self.infographic.is_some(),
            Visualization::SpeedDistribution => self.speed_chart.is_some(),
            Visualization::Stats => self.stats.is_some(),
        }
    }

    fn fetch_panel(&self, panel: Visualization) -> Task<Message> {
        let client = self.client.clone();
        match panel {
            Visualization::Heatmap => Task::perform(
                async move { client.fetch_heatmap().await.map_err(|err| err.user_message()) },
                |result| Message::ImageFetched(Visualization::Heatmap, result),
            ),
            Visualization::Infographic => Task::perform(
                async move {
                    client
                        .fetch_infographic()
                        .await
                        .map_err(|err| err.user_message())
                },
                |result| Message::ImageFetched(Visualization::Infographic, result),
            ),
            Visualization::SpeedDistribution => Task::perform(
                async move {
                    client
                        .fetch_speed_distribution()
                        .await
                        .map_err(|err| err.user_message())
                },
                |result| Message::ImageFetched(Visualization::SpeedDistribution, result),
            ),
            Visualization::Stats => Task::perform(
                async move { client.fetch_stats().await.map_err(|err| err.user_message()) },
                Message::StatsFetched,
            ),
        }
    }
}

fn panel_view(state: &Dashboard) -> Element<'_, Message> {
    let Some(panel) = state.panel else {
        return text("Выберите визуализацию").size(14).into();
    };
    if let Some((failed, reason)) = &state.panel_error {
        if *failed == panel {
            return text(format!("Ошибка: {reason}")).size(14).into();
        }
    }
    match panel {
        Visualization::Heatmap => image_or_loading(&state.heatmap),
        Visualization::Infographic => image_or_loading(&state.infographic),
        Visualization::SpeedDistribution => image_or_loading(&state.speed_chart),
        Visualization::Stats => stats_view(state.stats.as_ref()),
    }
}

fn image_or_loading(handle: &Option<image::Handle>) -> Element<'_, Message> {
    match handle {
        Some(handle) => image(handle.clone()).width(Length::Fill).into(),
        None => text("Загрузка...").size(14).into(),
    }
}

fn stats_view(stats: Option<&StatisticsPayload>) -> Element<'_, Message> {
    match stats {
        Some(stats) => display::stat_rows(stats)
            .into_iter()
            .fold(Column::new().spacing(4), |rows, (label, value)| {
                rows.push(text(format!("{label}: {value}")).size(14))
            })
            .into(),
        None => text("Загрузка...").size(14).into(),
    }
}

fn notice_view(notice: &Notice) -> Element<'_, Message> {
    let mut body = column![text(&notice.text).size(14)].spacing(8);
    if let Some((filename, url)) = &notice.fallback {
        body = body.push(
            button(text(format!("Скачать {filename} вручную")).size(14))
                .padding(6)
                .on_press(Message::OpenFallbackLink(url.clone())),
        );
        body = body.push(text(url.as_str()).size(12));
    }
    body = body.push(
        button(text("Закрыть").size(12))
            .padding(4)
            .on_press(Message::NoticeClosed),
    );

    Container::new(Container::new(body).padding(16).style(notice_style))
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Alignment::End)
        .align_y(Alignment::Start)
        .padding(20)
        .into()
}

fn notice_style(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Color::from_rgb(0.13, 0.13, 0.16).into()),
        border: iced::border::rounded(6.0),
        ..container::Style::default()
    }
}
