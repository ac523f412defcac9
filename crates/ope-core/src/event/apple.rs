//! Apple Event source for macOS.
//!
//! LaunchServices delivers `ope://` URLs to the bundle as a
//! `kInternetEventClass`/`kAEGetURL` Apple Event. The handler object below
//! is registered with `NSAppleEventManager`; it pushes each URL into the
//! queue owned by its [`AppleEventSource`] (reachable through an ivar), and
//! [`AppleEventSource::next_event`] drains that queue while pumping the
//! `NSApplication` event loop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::{CStr, c_char, c_void};
use std::time::Instant;

use objc::declare::ClassDecl;
use objc::runtime::{BOOL, Class, Object, Sel, YES};
use objc::{class, msg_send, sel, sel_impl};
use tracing::{debug, warn};

use super::{EventPoll, EventSource, IncomingEvent};
use crate::error::{Error, Result};

/// `'GURL'`
const INTERNET_EVENT_CLASS: u32 = u32::from_be_bytes(*b"GURL");
/// `'GURL'`
const AE_GET_URL: u32 = u32::from_be_bytes(*b"GURL");
/// `'----'`
const KEY_DIRECT_OBJECT: u32 = u32::from_be_bytes(*b"----");

/// `NSApplicationActivationPolicyAccessory`: no Dock icon, no menu bar.
const ACTIVATION_POLICY_ACCESSORY: isize = 1;
/// `NSEventMaskAny`
const EVENT_MASK_ANY: u64 = u64::MAX;

const HANDLER_CLASS: &str = "OpeUrlEventHandler";
/// Ivar holding a `*const EventQueue` owned by the source.
const QUEUE_IVAR: &str = "opeEventQueue";

type EventQueue = RefCell<VecDeque<IncomingEvent>>;

#[link(name = "AppKit", kind = "framework")]
unsafe extern "C" {}

#[link(name = "Foundation", kind = "framework")]
unsafe extern "C" {
    static NSDefaultRunLoopMode: *mut Object;
}

/// Receives URL events through `NSAppleEventManager`.
///
/// Each source owns its queue; the handler object only borrows it, and the
/// link is cut when the source is dropped.
pub struct AppleEventSource {
    app: *mut Object,
    handler: *mut Object,
    queue: Box<EventQueue>,
}

impl AppleEventSource {
    pub fn new() -> Self {
        Self {
            app: std::ptr::null_mut(),
            handler: std::ptr::null_mut(),
            queue: Box::new(RefCell::new(VecDeque::new())),
        }
    }

    fn pop_received(&self) -> Option<IncomingEvent> {
        self.queue.borrow_mut().pop_front()
    }

    fn queue_ptr(&self) -> *mut c_void {
        &*self.queue as *const EventQueue as *mut c_void
    }
}

impl Drop for AppleEventSource {
    fn drop(&mut self) {
        if self.handler.is_null() {
            return;
        }
        // SAFETY: `handler` is the live instance created in
        // `register_url_handler`; clearing the ivar stops it from touching
        // the queue freed below.
        unsafe {
            (*self.handler).set_ivar::<*mut c_void>(QUEUE_IVAR, std::ptr::null_mut());
            let manager: *mut Object =
                msg_send![class!(NSAppleEventManager), sharedAppleEventManager];
            let _: () = msg_send![manager,
                removeEventHandlerForEventClass: INTERNET_EVENT_CLASS
                andEventID: AE_GET_URL];
        }
    }
}

impl Default for AppleEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for AppleEventSource {
    fn register_url_handler(&mut self) -> Result<()> {
        if !self.handler.is_null() {
            return Ok(());
        }

        let class = handler_class()?;

        // SAFETY: plain Objective-C message sends on the main thread. The
        // handler instance is intentionally never released; the event
        // manager holds a weak reference to it for the process lifetime.
        unsafe {
            let app: *mut Object = msg_send![class!(NSApplication), sharedApplication];
            let _: BOOL = msg_send![app, setActivationPolicy: ACTIVATION_POLICY_ACCESSORY];

            let handler: *mut Object = msg_send![class, new];
            (*handler).set_ivar::<*mut c_void>(QUEUE_IVAR, self.queue_ptr());
            let manager: *mut Object =
                msg_send![class!(NSAppleEventManager), sharedAppleEventManager];
            let _: () = msg_send![manager,
                setEventHandler: handler
                andSelector: sel!(handleGetURLEvent:withReplyEvent:)
                forEventClass: INTERNET_EVENT_CLASS
                andEventID: AE_GET_URL];

            // The launch URL is delivered right after launching finishes, so
            // the handler must be installed first.
            let _: () = msg_send![app, finishLaunching];

            self.app = app;
            self.handler = handler;
        }

        debug!("Registered kAEGetURL handler");
        Ok(())
    }

    fn next_event(&mut self, deadline: Option<Instant>) -> EventPoll {
        if self.app.is_null() {
            warn!("Apple event source polled before registration");
            return EventPoll::Closed;
        }

        loop {
            if let Some(event) = self.pop_received() {
                return EventPoll::Event(event);
            }

            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            if remaining.is_some_and(|r| r.is_zero()) {
                return EventPoll::Timeout;
            }

            // SAFETY: message sends to NSApplication/NSDate on the main
            // thread; the pool drains the autoreleased date and event.
            unsafe {
                let pool: *mut Object = msg_send![class!(NSAutoreleasePool), new];
                let until: *mut Object = match remaining {
                    Some(r) => msg_send![class!(NSDate), dateWithTimeIntervalSinceNow: r.as_secs_f64()],
                    None => msg_send![class!(NSDate), distantFuture],
                };
                let ns_event: *mut Object = msg_send![self.app,
                    nextEventMatchingMask: EVENT_MASK_ANY
                    untilDate: until
                    inMode: NSDefaultRunLoopMode
                    dequeue: YES];
                if !ns_event.is_null() {
                    let _: () = msg_send![self.app, sendEvent: ns_event];
                }
                let _: () = msg_send![pool, drain];
            }
        }
    }
}

fn handler_class() -> Result<&'static Class> {
    if let Some(class) = Class::get(HANDLER_CLASS) {
        return Ok(class);
    }

    let mut decl = ClassDecl::new(HANDLER_CLASS, class!(NSObject)).ok_or_else(|| {
        Error::RegistrationFailed(format!("cannot declare class {HANDLER_CLASS}"))
    })?;

    decl.add_ivar::<*mut c_void>(QUEUE_IVAR);

    // SAFETY: the function signature matches the selector's argument list.
    unsafe {
        decl.add_method(
            sel!(handleGetURLEvent:withReplyEvent:),
            handle_get_url_event as extern "C" fn(&Object, Sel, *mut Object, *mut Object),
        );
    }

    Ok(decl.register())
}

extern "C" fn handle_get_url_event(
    this: &Object,
    _cmd: Sel,
    event: *mut Object,
    _reply: *mut Object,
) {
    // SAFETY: `event` is the NSAppleEventDescriptor passed by the event
    // manager for the duration of this call.
    let url = unsafe { direct_object_string(event) };
    if url.is_none() {
        debug!("kAEGetURL event without a string direct object");
    }

    // SAFETY: the ivar is either null or points at the queue of the live
    // source that registered this handler; events run on the main thread.
    let queue = unsafe { *this.get_ivar::<*mut c_void>(QUEUE_IVAR) } as *const EventQueue;
    if queue.is_null() {
        debug!("kAEGetURL event after the source was dropped");
        return;
    }
    unsafe { &*queue }
        .borrow_mut()
        .push_back(IncomingEvent::from_direct_object(url));
}

/// Read `keyDirectObject` from an Apple Event descriptor as a string.
unsafe fn direct_object_string(event: *mut Object) -> Option<String> {
    if event.is_null() {
        return None;
    }
    unsafe {
        let descriptor: *mut Object = msg_send![event, paramDescriptorForKeyword: KEY_DIRECT_OBJECT];
        if descriptor.is_null() {
            return None;
        }
        let value: *mut Object = msg_send![descriptor, stringValue];
        if value.is_null() {
            return None;
        }
        let utf8: *const c_char = msg_send![value, UTF8String];
        if utf8.is_null() {
            return None;
        }
        CStr::from_ptr(utf8).to_str().ok().map(str::to_owned)
    }
}
