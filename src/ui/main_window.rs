use fltk::{app::Sender, group::Wizard, prelude::*, window::Window};

use crate::app::messages::Message;
use super::editor_view::EditorView;
use super::login_view::LoginView;
use super::notes_view::NotesView;
use super::theme::{palette, Palette};

pub struct MainWidgets {
    pub wind: Window,
    pub wizard: Wizard,
    pub login: LoginView,
    pub notes: NotesView,
    pub editor: EditorView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Notes,
    Editor,
}

pub fn build_main_window(sender: &Sender<Message>) -> MainWidgets {
    let mut wind = Window::new(100, 100, 480, 640, "Shared Notes");
    wind.set_xclass("SharedNotes");

    let wizard = Wizard::new(0, 0, 480, 640, None);
    let login = LoginView::build(sender);
    let notes = NotesView::build(sender);
    let editor = EditorView::build(sender);
    wizard.end();

    wind.end();
    wind.resizable(&wizard);

    MainWidgets {
        wind,
        wizard,
        login,
        notes,
        editor,
    }
}

impl MainWidgets {
    pub fn show_view(&mut self, view: View) {
        match view {
            View::Login => self.wizard.set_current_widget(&self.login.group),
            View::Notes => self.wizard.set_current_widget(&self.notes.group),
            View::Editor => self.wizard.set_current_widget(&self.editor.group),
        }
        self.wind.redraw();
    }

    pub fn apply_theme(&mut self, is_dark: bool, dim_level: f64) -> Palette {
        let palette = palette(is_dark, dim_level);
        self.wind.set_color(palette.window_bg);
        self.login.apply_palette(&palette);
        self.notes.apply_palette(&palette);
        self.editor.apply_palette(&palette);
        self.wind.redraw();
        palette
    }
}
