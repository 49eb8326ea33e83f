//! Selection overlay for a text field: handles, menu and drag gestures.
//!
//! The overlay subsystem itself (drawing handles, showing the menu) lives
//! behind [`SelectOverlayProxy`]. [`TextFieldSelectOverlay`] decides what the
//! proxy shows and turns handle drags into selection-controller updates,
//! auto-scrolling the text while a handle is held near a content edge.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use arkui_core::{
    CancelableTask, OffsetF, RectF, TextFieldTheme,
    geometry::{EPSILON, nearly_equal},
};
use parking_lot::Mutex;
use tracing::debug;

use super::{
    CopyOptions,
    ai::CaretUpdateType,
    host::SelectOverlayHost,
    paragraph::TextAffinity,
    select_controller::TextSelectController,
};

/// Delay between two auto-scroll steps while a handle is held at an edge.
pub const AUTO_SCROLL_INTERVAL: Duration = Duration::from_millis(15);

/// Where an overlay request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlaySource {
    /// Touch gesture.
    #[default]
    Touch,
    /// Mouse right click.
    RightClick,
    /// Keyboard shortcut.
    Keyboard,
}

/// A request to show the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayRequest {
    /// Show the menu together with the handles.
    pub menu_is_show: bool,
    /// What triggered the request.
    pub source: OverlaySource,
}

/// Why the overlay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCloseReason {
    /// Closed by the field, e.g. after an edit.
    Normal,
    /// The dragged handles met and the field went back to caret mode.
    HandlesCollapsed,
    /// The field lost focus.
    FocusLost,
}

/// Menu entries to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectMenuInfo {
    /// Copy.
    pub show_copy: bool,
    /// Cut.
    pub show_cut: bool,
    /// Paste.
    pub show_paste: bool,
    /// Select all.
    pub show_copy_all: bool,
    /// Camera text input.
    pub show_camera_input: bool,
    /// AI writing.
    pub show_ai_write: bool,
}

/// One handle as shown by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayHandle {
    /// Field-local rectangle.
    pub rect: RectF,
    /// Whether the handle is inside the content rect.
    pub visible: bool,
}

/// Everything the overlay subsystem needs to draw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectOverlayInfo {
    /// Caret-handle mode.
    pub is_single_handle: bool,
    /// Selection start handle. Hidden in single-handle mode.
    pub first_handle: OverlayHandle,
    /// Selection end handle, or the caret handle.
    pub second_handle: OverlayHandle,
    /// Menu entries.
    pub menu: SelectMenuInfo,
    /// Whether the menu is shown.
    pub menu_visible: bool,
}

/// The generic selection-overlay subsystem.
pub trait SelectOverlayProxy: Send + Sync {
    /// Shows the overlay.
    fn show(&self, info: &SelectOverlayInfo);
    /// Updates a shown overlay.
    fn update(&self, info: &SelectOverlayInfo);
    /// Closes the overlay.
    fn close(&self, reason: OverlayCloseReason);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HandleDrag {
    rect: RectF,
    is_first: bool,
}

/// Overlay state for one text field.
pub struct TextFieldSelectOverlay {
    host: Weak<dyn SelectOverlayHost>,
    proxy: Arc<dyn SelectOverlayProxy>,
    this: Weak<Mutex<TextFieldSelectOverlay>>,
    theme: TextFieldTheme,
    info: Option<SelectOverlayInfo>,
    is_single_handle: bool,
    menu_requested: bool,
    dragging: Option<HandleDrag>,
    scroll_direction: Option<OffsetF>,
    auto_scroll_task: CancelableTask,
    dirty: bool,
}

impl TextFieldSelectOverlay {
    /// Creates the overlay controller for `host`.
    pub fn new(
        host: Weak<dyn SelectOverlayHost>,
        proxy: Arc<dyn SelectOverlayProxy>,
        theme: TextFieldTheme,
    ) -> Arc<Mutex<Self>> {
        Arc::new_cyclic(|this| {
            Mutex::new(Self {
                host,
                proxy,
                this: this.clone(),
                theme,
                info: None,
                is_single_handle: true,
                menu_requested: false,
                dragging: None,
                scroll_direction: None,
                auto_scroll_task: CancelableTask::new(),
                dirty: false,
            })
        })
    }

    fn host(&self) -> Option<Arc<dyn SelectOverlayHost>> {
        let host = self.host.upgrade();
        if host.is_none() {
            debug!("overlay host dropped, overlay update skipped");
        }
        host
    }

    /// Whether the overlay is shown.
    pub fn is_shown(&self) -> bool {
        self.info.is_some()
    }

    /// Whether the overlay is in caret-handle mode.
    pub fn is_single_handle(&self) -> bool {
        self.is_single_handle
    }

    /// Whether a handle is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    /// Whether auto-scroll is running.
    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll_task.is_pending()
    }

    /// The last info handed to the proxy.
    pub fn info(&self) -> Option<SelectOverlayInfo> {
        self.info
    }

    /// Returns and clears the redraw flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Gatekeeper for showing the overlay. Refuses right-click requests when
    /// the menu is hidden, and any request while the font size is zero and
    /// nothing is shown. Picks single- or dual-handle mode on success.
    pub fn pre_process_overlay(&mut self, request: &OverlayRequest) -> bool {
        let Some(host) = self.host() else {
            return false;
        };
        if request.source == OverlaySource::RightClick && host.is_selection_menu_hidden() {
            debug!("right click overlay refused, selection menu hidden");
            return false;
        }
        if host.font_size() <= EPSILON && !self.is_shown() {
            debug!("overlay refused for zero font size");
            return false;
        }
        let Some(controller) = host.select_controller() else {
            return false;
        };
        self.update_pattern(&mut controller.write());
        true
    }

    fn update_pattern(&mut self, controller: &mut TextSelectController) {
        controller.calculate_handle_offset();
        if !controller.is_selected() {
            self.is_single_handle = true;
            return;
        }
        let first = controller.first_handle_info().rect;
        let second = controller.second_handle_info().rect;
        let same_position =
            nearly_equal(first.x, second.x) && nearly_equal(first.y, second.y);
        let area: f32 = controller
            .selection_rects()
            .iter()
            .map(|rect| rect.width)
            .sum();
        if same_position || area <= EPSILON {
            debug!("selection collapsed, overlay switches to caret handle");
            let index = controller.second_handle_index();
            controller.move_caret_to_content_rect(index, TextAffinity::Downstream, false, false);
            self.is_single_handle = true;
        } else {
            self.is_single_handle = false;
        }
    }

    /// Shows the overlay if [`pre_process_overlay`](Self::pre_process_overlay)
    /// allows it.
    pub fn show_overlay(&mut self, request: &OverlayRequest) -> bool {
        if !self.pre_process_overlay(request) {
            return false;
        }
        let Some(host) = self.host() else {
            return false;
        };
        self.menu_requested = request.menu_is_show;
        let Some(info) = self.build_info(host.as_ref()) else {
            return false;
        };
        if !self.is_single_handle {
            host.set_caret_twinkling(false);
        }
        let was_shown = self.info.replace(info).is_some();
        if was_shown {
            self.proxy.update(&info);
        } else {
            self.proxy.show(&info);
        }
        debug!(single = self.is_single_handle, "overlay shown");
        true
    }

    /// Re-reads handle positions after a relayout or edit.
    pub fn update_overlay(&mut self) {
        if !self.is_shown() {
            return;
        }
        let Some(host) = self.host() else {
            return;
        };
        if let Some(controller) = host.select_controller() {
            self.update_pattern(&mut controller.write());
        }
        self.refresh(host.as_ref());
    }

    fn refresh(&mut self, host: &dyn SelectOverlayHost) {
        let Some(info) = self.build_info(host) else {
            return;
        };
        if self.info.is_some() {
            self.info = Some(info);
            self.proxy.update(&info);
            self.dirty = true;
        }
    }

    fn build_info(&self, host: &dyn SelectOverlayHost) -> Option<SelectOverlayInfo> {
        let controller = host.select_controller()?;
        let controller = controller.read();
        let content = host.content_rect();
        let (first_handle, second_handle) = if self.is_single_handle {
            let caret = controller.caret_rect();
            (
                OverlayHandle::default(),
                OverlayHandle {
                    rect: caret,
                    visible: is_handle_visible(caret, content),
                },
            )
        } else {
            let first = controller.first_handle_info().rect;
            let second = controller.second_handle_info().rect;
            (
                OverlayHandle {
                    rect: first,
                    visible: is_handle_visible(first, content),
                },
                OverlayHandle {
                    rect: second,
                    visible: is_handle_visible(second, content),
                },
            )
        };
        Some(SelectOverlayInfo {
            is_single_handle: self.is_single_handle,
            first_handle,
            second_handle,
            menu: Self::on_update_menu_info(host, &controller),
            menu_visible: self.menu_requested
                && self.dragging.is_none()
                && !host.is_selection_menu_hidden(),
        })
    }

    /// Menu entry policy.
    ///
    /// Copy and cut need a selection, a copy policy and a non-password
    /// field. Select all is hidden once everything is selected. Camera input
    /// needs an empty selection, AI writing a non-empty one.
    pub fn on_update_menu_info(
        host: &dyn SelectOverlayHost,
        controller: &TextSelectController,
    ) -> SelectMenuInfo {
        let has_selection = controller.is_selected();
        let is_password = host.is_password();
        let can_copy =
            has_selection && host.copy_options() != CopyOptions::None && !is_password;
        let has_text = host
            .content_controller()
            .is_some_and(|content| !content.read().is_empty());
        let capabilities = host.capabilities();
        SelectMenuInfo {
            show_copy: can_copy,
            show_cut: can_copy,
            show_paste: host.is_paste_available(),
            show_copy_all: has_text && !controller.is_selected_all(),
            show_camera_input: !has_selection && capabilities.camera_input,
            show_ai_write: has_selection && !is_password && capabilities.ai_write,
        }
    }

    /// A handle drag starts: the menu hides, the caret stops blinking and the
    /// magnifier appears.
    pub fn on_handle_move_start(&mut self, handle_rect: RectF, is_first: bool) {
        let Some(host) = self.host() else {
            return;
        };
        if let Some(controller) = host.select_controller() {
            controller
                .write()
                .set_caret_update_type(CaretUpdateType::HandleMove);
        }
        self.dragging = Some(HandleDrag {
            rect: handle_rect,
            is_first,
        });
        host.set_caret_twinkling(false);
        host.update_magnifier(Some(handle_rect.center()));
        if let Some(info) = self.info.as_mut() {
            info.menu_visible = false;
            self.proxy.update(info);
        }
        self.dirty = true;
        debug!(is_first, single = self.is_single_handle, "handle move start");
    }

    /// One drag frame. `handle_rect` is the dragged handle, field-local.
    pub fn on_handle_move(&mut self, handle_rect: RectF, is_first: bool) {
        let Some(host) = self.host() else {
            return;
        };
        self.dragging = Some(HandleDrag {
            rect: handle_rect,
            is_first,
        });
        self.trigger_content_to_scroll(host.as_ref(), handle_rect.center());
        self.apply_handle_move(host.as_ref(), handle_rect, is_first);
    }

    fn apply_handle_move(&mut self, host: &dyn SelectOverlayHost, handle_rect: RectF, is_first: bool) {
        let Some(controller) = host.select_controller() else {
            return;
        };
        let offset = Self::get_caret_position_on_handle_move(host, handle_rect.center());
        let changed = {
            let mut controller = controller.write();
            if self.is_single_handle {
                let before = controller.caret_index();
                controller.update_caret_info_by_offset(offset, false, true);
                host.update_magnifier(Some(controller.caret_rect().center()));
                before != controller.caret_index()
            } else {
                let index = controller.convert_touch_offset_to_position(offset, false);
                let before = if is_first {
                    controller.first_handle_index()
                } else {
                    controller.second_handle_index()
                };
                if is_first {
                    controller.move_first_handle_to_content_rect(index, false, false);
                } else {
                    controller.move_second_handle_to_content_rect(index, false, false);
                }
                host.update_magnifier(Some(offset));
                before != index
            }
        };
        if changed {
            host.start_vibrator();
        }
        self.refresh(host);
    }

    /// Maps a handle point to the point used for hit testing.
    ///
    /// Text areas clamp the point into the content rect. Single-line fields
    /// use the content's vertical center and clamp x.
    pub fn get_caret_position_on_handle_move(
        host: &dyn SelectOverlayHost,
        local: OffsetF,
    ) -> OffsetF {
        let content = host.content_rect();
        let x = local.x.clamp(content.left(), content.right().max(content.left()));
        if host.is_text_area() {
            let bottom = (content.bottom() - EPSILON).max(content.top());
            OffsetF::new(x, local.y.clamp(content.top(), bottom))
        } else {
            OffsetF::new(x, content.center().y)
        }
    }

    /// Starts, redirects or stops auto-scroll depending on how close
    /// `local` is to a content edge.
    pub fn trigger_content_to_scroll(&mut self, host: &dyn SelectOverlayHost, local: OffsetF) {
        let content = host.content_rect();
        let threshold = self.theme.scroll_edge_threshold;
        let step = self.theme.auto_scroll_step;
        let direction = if host.is_text_area() {
            if local.y < content.top() + threshold {
                Some(OffsetF::new(0.0, step))
            } else if local.y > content.bottom() - threshold {
                Some(OffsetF::new(0.0, -step))
            } else {
                None
            }
        } else if local.x < content.left() + threshold {
            Some(OffsetF::new(step, 0.0))
        } else if local.x > content.right() - threshold {
            Some(OffsetF::new(-step, 0.0))
        } else {
            None
        };
        match direction {
            Some(direction) => {
                if self.scroll_direction != Some(direction) || !self.auto_scroll_task.is_pending() {
                    debug!(dx = direction.x, dy = direction.y, "auto-scroll start");
                    self.scroll_direction = Some(direction);
                    self.schedule_auto_scroll(host);
                }
            }
            None => self.stop_content_scroll(),
        }
    }

    fn schedule_auto_scroll(&self, host: &dyn SelectOverlayHost) {
        let Some(executor) = host.task_executor() else {
            return;
        };
        let this = self.this.clone();
        self.auto_scroll_task.schedule(
            executor.as_ref(),
            AUTO_SCROLL_INTERVAL,
            "text_field_auto_scroll",
            move || {
                if let Some(overlay) = this.upgrade() {
                    overlay.lock().on_auto_scroll_tick();
                }
            },
        );
    }

    fn on_auto_scroll_tick(&mut self) {
        let (Some(host), Some(direction)) = (self.host(), self.scroll_direction) else {
            return;
        };
        if !host.scroll_text_by(direction) {
            debug!("auto-scroll reached the end of the text");
            self.scroll_direction = None;
            return;
        }
        if let Some(drag) = self.dragging {
            self.apply_handle_move(host.as_ref(), drag.rect, drag.is_first);
        }
        self.schedule_auto_scroll(host.as_ref());
    }

    /// Cancels auto-scroll. Safe to call repeatedly.
    pub fn stop_content_scroll(&mut self) {
        if self.scroll_direction.take().is_some() {
            debug!("auto-scroll stop");
        }
        self.auto_scroll_task.cancel();
    }

    /// The drag ended.
    ///
    /// Auto-scroll stops and the menu comes back. Handles that met collapse
    /// to a blinking caret and the overlay closes; otherwise both handle
    /// rectangles are recomputed.
    pub fn on_handle_move_done(&mut self, handle_rect: RectF, is_first: bool) {
        self.stop_content_scroll();
        self.dragging = None;
        let Some(host) = self.host() else {
            return;
        };
        host.update_magnifier(None);
        let Some(controller) = host.select_controller() else {
            return;
        };
        let collapsed = {
            let mut controller = controller.write();
            controller.set_caret_update_type(CaretUpdateType::Pressed);
            if self.is_single_handle {
                let index = controller.caret_index();
                let affinity = controller.caret_affinity();
                controller.move_caret_to_content_rect(index, affinity, false, true);
                false
            } else if controller.first_handle_index() == controller.second_handle_index() {
                let index = controller.first_handle_index();
                controller.move_caret_to_content_rect(index, TextAffinity::Downstream, false, true);
                true
            } else {
                controller.calculate_handle_offset();
                false
            }
        };
        debug!(is_first, collapsed, rect = ?handle_rect, "handle move done");
        if collapsed {
            self.is_single_handle = true;
            host.set_caret_twinkling(true);
            self.close_overlay(OverlayCloseReason::HandlesCollapsed);
            return;
        }
        if self.is_single_handle {
            host.set_caret_twinkling(true);
        }
        self.menu_requested = true;
        self.refresh(host.as_ref());
        self.dirty = true;
    }

    /// Closes the overlay and stops any drag.
    pub fn close_overlay(&mut self, reason: OverlayCloseReason) {
        self.stop_content_scroll();
        self.dragging = None;
        if self.info.take().is_some() {
            self.proxy.close(reason);
            self.dirty = true;
            debug!(?reason, "overlay closed");
        }
    }
}

fn is_handle_visible(rect: RectF, content: RectF) -> bool {
    let center = rect.center();
    center.y >= content.top() - EPSILON
        && center.y <= content.bottom() + EPSILON
        && rect.left() >= content.left() - EPSILON
        && rect.left() <= content.right() + EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_visibility() {
        let content = RectF::new(0.0, 0.0, 100.0, 40.0);
        assert!(is_handle_visible(RectF::new(10.0, 0.0, 2.0, 20.0), content));
        assert!(!is_handle_visible(RectF::new(10.0, 40.0, 2.0, 20.0), content));
        assert!(!is_handle_visible(RectF::new(-10.0, 0.0, 2.0, 20.0), content));
    }
}
