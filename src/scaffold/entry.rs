//! Generated entry-point source for the packaged application.
//!
//! Two variants: a framed window that loads the site directly, and a
//! frameless window hosting the generated shell page with a custom
//! titlebar. Both persist window bounds in a small JSON state file in the
//! user-data location and center on first run.

use crate::config::{BuildConfig, FrameMode};

/// Escapes a string for embedding inside a double-quoted JS literal.
fn js_string(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// JS expression for the window icon option.
fn icon_expr(has_icon: bool) -> &'static str {
    if has_icon {
        "path.join(__dirname, 'icon.ico')"
    } else {
        "undefined"
    }
}

/// Renders the entry-point source for `config`.
#[must_use]
pub(super) fn entry_point_source(config: &BuildConfig, has_icon: bool) -> String {
    let template = match config.frame {
        FrameMode::System => FRAMED_TEMPLATE,
        FrameMode::Custom(_) => FRAMELESS_TEMPLATE,
    };
    template
        .replace("__WIDTH__", &config.window.width.to_string())
        .replace("__HEIGHT__", &config.window.height.to_string())
        .replace("__RESIZABLE__", bool_js(config.window.resizable))
        .replace("__MINIMIZABLE__", bool_js(config.window.minimizable))
        .replace("__MAXIMIZABLE__", bool_js(config.window.maximizable))
        .replace("__NO_SCROLLBAR__", bool_js(config.window.no_scrollbar))
        .replace("__ICON__", icon_expr(has_icon))
        .replace("__URL__", &js_string(&config.url))
        .trim_start()
        .to_string()
}

fn bool_js(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// System-chrome variant: loads the target URL directly.
const FRAMED_TEMPLATE: &str = r##"
const { app, BrowserWindow } = require('electron');
const path = require('path');
const fs = require('fs');

let win;

const storePath = path.join(app.getPath('userData'), 'window-state.json');
function loadState() {
  try { return JSON.parse(fs.readFileSync(storePath, 'utf8')); } catch { return {}; }
}
function saveState(bounds) {
  try { fs.writeFileSync(storePath, JSON.stringify(bounds)); } catch {}
}

function createWindow() {
  const state = loadState();
  win = new BrowserWindow({
    x: Number.isFinite(state.x) ? state.x : undefined,
    y: Number.isFinite(state.y) ? state.y : undefined,
    width: Number.isFinite(state.width) ? state.width : __WIDTH__,
    height: Number.isFinite(state.height) ? state.height : __HEIGHT__,
    resizable: __RESIZABLE__,
    minimizable: __MINIMIZABLE__,
    maximizable: __MAXIMIZABLE__,
    frame: true,
    icon: __ICON__,
    webPreferences: {
      nodeIntegration: false,
      contextIsolation: true,
      sandbox: true
    }
  });

  if (!Number.isFinite(state.x) || !Number.isFinite(state.y)) {
    win.center();
  }

  win.loadURL("__URL__");

  const NO_SCROLLBAR = __NO_SCROLLBAR__;
  if (NO_SCROLLBAR) {
    const CSS = `
      html, body { overflow: hidden !important; scrollbar-width: none !important; }
      ::-webkit-scrollbar { display: none !important; width: 0 !important; height: 0 !important; }
    `;
    const apply = () => { try { win.webContents.insertCSS(CSS); } catch {} };
    win.webContents.on('did-finish-load', apply);
    win.webContents.on('dom-ready', apply);
  }

  win.on('close', () => {
    if (__RESIZABLE__ && !win.isMinimized() && !win.isMaximized()) {
      saveState(win.getBounds());
    }
  });
}
app.whenReady().then(createWindow);
"##;

/// Frameless variant: hosts the shell page and wires the window-control
/// channel used by the custom titlebar.
const FRAMELESS_TEMPLATE: &str = r##"
const { app, BrowserWindow, ipcMain, shell } = require('electron');
const path = require('path');
const fs = require('fs');

let mainWin;

const storePath = path.join(app.getPath('userData'), 'window-state.json');
function loadState() {
  try { return JSON.parse(fs.readFileSync(storePath, 'utf8')); } catch { return {}; }
}
function saveState(bounds) {
  try { fs.writeFileSync(storePath, JSON.stringify(bounds)); } catch {}
}

function createWindow() {
  const state = loadState();
  mainWin = new BrowserWindow({
    x: Number.isFinite(state.x) ? state.x : undefined,
    y: Number.isFinite(state.y) ? state.y : undefined,
    width: Number.isFinite(state.width) ? state.width : __WIDTH__,
    height: Number.isFinite(state.height) ? state.height : __HEIGHT__,
    resizable: __RESIZABLE__,
    minimizable: __MINIMIZABLE__,
    maximizable: __MAXIMIZABLE__,
    frame: false,
    useContentSize: true,
    icon: __ICON__,
    webPreferences: {
      preload: path.join(__dirname, 'preload.js'),
      nodeIntegration: false,
      contextIsolation: true,
      sandbox: false,
      webviewTag: true
    }
  });

  if (!Number.isFinite(state.x) || !Number.isFinite(state.y)) {
    mainWin.center();
  }

  mainWin.loadFile('index.html');

  mainWin.on('maximize', () => mainWin.webContents.send('window-state', 'maximized'));
  mainWin.on('unmaximize', () => mainWin.webContents.send('window-state', 'restored'));

  mainWin.on('close', () => {
    if (__RESIZABLE__ && !mainWin.isMinimized() && !mainWin.isMaximized()) {
      saveState(mainWin.getBounds());
    }
  });
}

ipcMain.handle('window-control', (_e, action) => {
  if (!mainWin) return;
  if (action === 'minimize') mainWin.minimize();
  else if (action === 'toggle-max') {
    if (mainWin.isMaximized()) mainWin.unmaximize();
    else mainWin.maximize();
  } else if (action === 'close') mainWin.close();
  else if (action === 'request-state') {
    mainWin.webContents.send('window-state', mainWin.isMaximized() ? 'maximized' : 'restored');
  }
});
ipcMain.handle('open-external', async (_e, url) => {
  if (typeof url === 'string') { await shell.openExternal(url); return true; }
  return false;
});

app.whenReady().then(createWindow);
"##;
