//! The page runtime: every component wired to one set of host ports.

use std::rc::Rc;

use tracing::info;
use vaarthalu_core::{Clock, Config, EventSink, FlagStore, Params, Scheduler};

use crate::{
    ads::AdManager,
    behavior::{BehaviorTracker, VideoEvent, VideoInfo},
    exit_intent::ExitIntent,
    host::{Clipboard, HttpClient, NoticeSurface, NotificationPort, PageHost},
    newsletter::{NewsletterSubscriber, SubmitOutcome},
    notices::Notices,
    progress::{ReadingProgress, ScrollMetrics},
    push::{PushPrompter, PushState},
    share::{ShareDispatcher, ShareOutcome},
    site_events::{Click, SiteEvents},
    tracker::EventTracker,
};

/// Host capabilities handed to [`Engagement::start`].
pub struct Ports<H, C, N> {
    pub page: Rc<dyn PageHost>,
    pub surface: Rc<dyn NoticeSurface>,
    /// The tag-manager event queue.
    pub sink: Rc<dyn EventSink>,
    /// Direct `gtag` calls, when the page has the function.
    pub gtag: Option<Rc<dyn EventSink>>,
    pub flags: Rc<dyn FlagStore>,
    pub clock: Rc<dyn Clock>,
    pub scheduler: Rc<dyn Scheduler>,
    pub http: H,
    pub clipboard: C,
    pub notifications: N,
}

/// Running engagement features for one page view.
pub struct Engagement<H, C, N> {
    page: Rc<dyn PageHost>,
    tracker: EventTracker,
    site: SiteEvents,
    newsletter: NewsletterSubscriber<H>,
    push: Rc<PushPrompter<N>>,
    exit: ExitIntent,
    progress: ReadingProgress,
    behavior: BehaviorTracker,
    ads: Rc<AdManager>,
    share: ShareDispatcher<C>,
}

impl<H, C, N> Engagement<H, C, N>
where
    H: HttpClient,
    C: Clipboard,
    N: NotificationPort + 'static,
{
    /// Build every component, record the page view, arm the push prompt
    /// and start the ad refresh cycle.
    pub fn start(config: &Config, ports: Ports<H, C, N>) -> Rc<Self> {
        let Ports {
            page,
            surface,
            sink,
            gtag,
            flags,
            clock,
            scheduler,
            http,
            clipboard,
            notifications,
        } = ports;

        let info = page.info();
        let tracker = EventTracker::new(sink);
        let notices = Rc::new(Notices::new(
            surface,
            Rc::clone(&scheduler),
            config.notices.clone(),
        ));

        let engagement = Rc::new(Self {
            site: SiteEvents::new(tracker.clone(), info.clone()),
            newsletter: NewsletterSubscriber::new(
                http,
                config.newsletter.endpoint.clone(),
                Rc::clone(&page),
                Rc::clone(&notices),
                tracker.clone(),
                config.messages.clone(),
            ),
            push: Rc::new(PushPrompter::new(
                notifications,
                Rc::clone(&flags),
                Rc::clone(&page),
                Rc::clone(&notices),
                tracker.clone(),
                config.push.clone(),
                config.messages.push_enabled.clone(),
            )),
            exit: ExitIntent::new(
                flags,
                Rc::clone(&page),
                tracker.clone(),
                config.exit_intent.clone(),
            ),
            progress: ReadingProgress::new(Rc::clone(&page), tracker.clone(), &config.progress),
            behavior: BehaviorTracker::new(tracker.clone(), clock, info.href.clone()),
            ads: Rc::new(AdManager::new(Rc::clone(&page), tracker.clone(), &config.ads)),
            share: ShareDispatcher::new(
                clipboard,
                Rc::clone(&page),
                notices,
                gtag,
                config.share.clone(),
                config.messages.link_copied.clone(),
            ),
            page,
            tracker,
        });

        engagement.site.page_view();
        engagement.push.arm(scheduler.as_ref());
        engagement.ads.start(scheduler.as_ref());
        info!(path = %info.pathname, "engagement started");

        engagement
    }

    pub fn push_state(&self) -> PushState {
        self.push.state()
    }

    /// Dispatch a document click.
    pub async fn on_click(&self, click: &Click) {
        if let Some(button) = &click.share_button {
            self.site.share_click(&button.platform);
            let info = self.page.info();
            let title = non_empty(button.title.as_deref()).unwrap_or(&info.title);
            let url = non_empty(button.url.as_deref()).unwrap_or(&info.href);
            self.share.share(&button.platform, title, url).await;
        }

        if let Some(platform) = &click.floating_option {
            let info = self.page.info();
            self.share.share(platform, &info.title, &info.href).await;
        }

        if click.floating_toggle {
            self.page.toggle_floating_share();
        }

        if let Some(link) = &click.link {
            self.site.link_click(link);
        }

        if let Some(tag) = &click.ad_slot {
            self.ads.on_click(tag);
        }
    }

    /// The `form`-th `.newsletter-form` was submitted with this address.
    pub async fn on_newsletter_submit(&self, form: usize, email: &str) -> SubmitOutcome {
        self.site.newsletter_signup();
        self.newsletter.submit(form, email).await
    }

    pub fn on_scroll(&self, metrics: ScrollMetrics) {
        self.progress.on_scroll(metrics);
        self.behavior.on_scroll(metrics);
    }

    pub fn on_pointer_move(&self, client_y: f64) {
        self.exit.on_pointer_move(client_y);
    }

    pub fn on_pointer_out(&self, client_y: f64, leaving_window: bool) -> bool {
        self.exit.on_pointer_out(client_y, leaving_window)
    }

    /// Page is going away. Returns the seconds reported as time on page.
    pub fn on_unload(&self) -> u64 {
        self.behavior.on_unload()
    }

    pub fn on_video(&self, event: VideoEvent, video: &VideoInfo) {
        self.behavior.on_video(event, video);
    }

    pub async fn request_push_permission(&self) -> PushState {
        self.push.request_permission().await
    }

    pub async fn share(&self, platform: &str, title: &str, url: &str) -> ShareOutcome {
        self.share.share(platform, title, url).await
    }

    pub fn track(&self, name: &str, params: Params) {
        self.tracker.track_with(name, params);
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
