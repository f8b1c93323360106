//! Frame and listener bookkeeping provided by the hosting environment.

/// Identifier of a pending next-frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// Wraps a host-specific request identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Host-specific request identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifier of a registered event listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

impl ListenerHandle {
    /// Wraps a host-specific listener identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Host-specific listener identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Event sources a running level listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Key presses steering the snake.
    Keyboard,
    /// Changes of the drawing surface size.
    Resize,
}

/// Environment that delivers animation frames and input events.
pub trait FrameHost {
    /// Asks for one callback on the next display refresh.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraws a request so its frame is never delivered.
    fn cancel_frame(&mut self, request: FrameRequest);

    /// Starts delivering events of the given kind.
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerHandle;

    /// Stops delivering events for a previously registered listener.
    fn remove_listener(&mut self, handle: ListenerHandle);
}

/// Host driven by an outer loop that polls for due frames.
///
/// At most one frame request is outstanding at a time. Backends pump it once
/// per display refresh and forward the returned request to the scheduler.
#[derive(Debug, Default)]
pub struct PolledHost {
    next_id: u64,
    pending_frame: Option<FrameRequest>,
    listeners: Vec<(ListenerHandle, ListenerKind)>,
}

impl PolledHost {
    /// Creates a host with no pending frame and no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the outstanding frame request, if any.
    pub fn take_due_frame(&mut self) -> Option<FrameRequest> {
        self.pending_frame.take()
    }

    /// Reports whether a frame request is outstanding.
    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Reports whether at least one listener of `kind` is registered.
    #[must_use]
    pub fn listens(&self, kind: ListenerKind) -> bool {
        self.listener_count(kind) > 0
    }

    /// Number of registered listeners of `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.listeners
            .iter()
            .filter(|(_, registered)| *registered == kind)
            .count()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }
}

impl FrameHost for PolledHost {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest::new(self.next_id());
        self.pending_frame = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending_frame == Some(request) {
            self.pending_frame = None;
        }
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerHandle {
        let handle = ListenerHandle::new(self.next_id());
        self.listeners.push((handle, kind));
        handle
    }

    fn remove_listener(&mut self, handle: ListenerHandle) {
        self.listeners.retain(|(registered, _)| *registered != handle);
    }
}
