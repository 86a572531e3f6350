//! Generated shell page and preload bridge for the frameless variant.
//!
//! The shell page renders a draggable topbar (back/forward/reload on the
//! left, window controls on the right) above an embedded view of the
//! target site. Buttons are inline SVG by default; custom-image mode
//! swaps in the user-supplied per-role assets.

use std::collections::HashMap;

use crate::config::{BuildConfig, ButtonRole, TitlebarOptions, TitlebarTheme};

/// Preload bridge exposing window controls to the shell page.
pub(super) const PRELOAD_SOURCE: &str = r"const { contextBridge, ipcRenderer } = require('electron');
contextBridge.exposeInMainWorld('appWindow', {
  control: (action) => ipcRenderer.invoke('window-control', action),
  onState: (cb) => ipcRenderer.on('window-state', (_e, s) => cb?.(s)),
  openExternal: (url) => ipcRenderer.invoke('open-external', url)
});
";

const SVG_BACK: &str = r#"<svg viewBox="0 0 24 24"><polyline points="15 18 9 12 15 6"/></svg>"#;
const SVG_FORWARD: &str = r#"<svg viewBox="0 0 24 24"><polyline points="9 18 15 12 9 6"/></svg>"#;
const SVG_RELOAD: &str = r#"<svg viewBox="0 0 24 24"><polyline points="23 4 23 10 17 10"/><polyline points="1 20 1 14 7 14"/><path d="M3.51 9a9 9 0 0 1 14.13-3.36L23 10"/><path d="M20.49 15A9 9 0 0 1 5.87 18.36L1 14"/></svg>"#;
const SVG_MINIMIZE: &str =
    r#"<svg viewBox="0 0 24 24"><line x1="5" y1="19" x2="19" y2="19"/></svg>"#;
const SVG_MAXIMIZE: &str =
    r#"<svg viewBox="0 0 24 24"><rect x="6" y="6" width="12" height="12" rx="1"/></svg>"#;
const SVG_CLOSE: &str = r#"<svg viewBox="0 0 24 24"><line x1="18" y1="6" x2="6" y2="18"/><line x1="6" y1="6" x2="18" y2="18"/></svg>"#;

/// Default stroke color for the SVG button icons.
const DEFAULT_ICON_COLOR: &str = "#6b7280";

/// Escapes a string for an HTML attribute value.
fn html_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders one topbar button.
///
/// Custom mode prefers the user-supplied image for the role; the
/// maximize button additionally carries both maximize and restore images
/// as data attributes so the shell script can swap them on state changes.
/// Roles without a custom image fall back to the built-in SVG.
fn button_html(
    id: &str,
    title: &str,
    role: ButtonRole,
    svg: &str,
    custom_buttons: &HashMap<ButtonRole, String>,
) -> String {
    if !custom_buttons.is_empty() {
        if role == ButtonRole::Maximize {
            let max_img = custom_buttons.get(&ButtonRole::Maximize).cloned();
            let restore_img = custom_buttons.get(&ButtonRole::Restore).cloned();
            if max_img.is_some() || restore_img.is_some() {
                let max_img = max_img.unwrap_or_default();
                let restore_img = restore_img.unwrap_or_default();
                let start = if max_img.is_empty() {
                    &restore_img
                } else {
                    &max_img
                };
                return format!(
                    r#"<button class="btn" id="{id}" title="{title}" aria-label="{title}" data-max-img="{max_img}" data-restore-img="{restore_img}"><img src="{start}" alt="maximize-restore" /></button>"#
                );
            }
        }
        if let Some(file) = custom_buttons.get(&role) {
            return format!(
                r#"<button class="btn" id="{id}" title="{title}" aria-label="{title}"><img src="{file}" alt="{}" /></button>"#,
                role.as_str()
            );
        }
    }
    format!(r#"<button class="btn" id="{id}" title="{title}" aria-label="{title}">{svg}</button>"#)
}

/// Renders the shell page for the frameless variant.
///
/// `custom_buttons` maps roles to generated asset file names (already
/// written into the workspace by the project assembly step).
#[must_use]
pub(super) fn shell_page(
    config: &BuildConfig,
    titlebar: &TitlebarOptions,
    custom_buttons: &HashMap<ButtonRole, String>,
) -> String {
    let product = super::naming::product_name(&config.name);
    let (bg, fg, border) = match titlebar.theme {
        TitlebarTheme::Dark => ("#1f1f1f", "#eee", "rgba(255,255,255,0.12)"),
        TitlebarTheme::Light => ("#ffffff", "#222", "rgba(0,0,0,0.08)"),
    };
    let icon_color = titlebar.color.as_deref().unwrap_or(DEFAULT_ICON_COLOR);
    let mode = if custom_buttons.is_empty() {
        "svg"
    } else {
        "custom"
    };
    // Generated apps run on the platform they are built on.
    let platform = match std::env::consts::OS {
        "windows" => "win32",
        "macos" => "darwin",
        other => other,
    };

    let mut right_buttons = String::new();
    if config.window.minimizable {
        right_buttons.push_str(&button_html(
            "btn-min",
            "Minimize",
            ButtonRole::Minimize,
            SVG_MINIMIZE,
            custom_buttons,
        ));
        right_buttons.push('\n');
    }
    if config.window.maximizable {
        right_buttons.push_str(&button_html(
            "btn-max",
            "Maximize/Restore",
            ButtonRole::Maximize,
            SVG_MAXIMIZE,
            custom_buttons,
        ));
        right_buttons.push('\n');
    }
    right_buttons.push_str(&button_html(
        "btn-close",
        "Close",
        ButtonRole::Close,
        SVG_CLOSE,
        custom_buttons,
    ));

    let left_buttons = [
        button_html("btn-back", "Back", ButtonRole::Back, SVG_BACK, custom_buttons),
        button_html(
            "btn-forward",
            "Forward",
            ButtonRole::Forward,
            SVG_FORWARD,
            custom_buttons,
        ),
        button_html(
            "btn-reload",
            "Reload",
            ButtonRole::Reload,
            SVG_RELOAD,
            custom_buttons,
        ),
    ]
    .join("\n");

    SHELL_TEMPLATE
        .replace("__PRODUCT_NAME__", &html_attr(&product))
        .replace("__TB_BG__", bg)
        .replace("__TB_FG__", fg)
        .replace("__TB_BORDER__", border)
        .replace("__ICON_COLOR__", icon_color)
        .replace("__TARGET_URL__", &html_attr(&config.url))
        .replace("__LEFT_BUTTONS__", &left_buttons)
        .replace("__RIGHT_BUTTONS__", &right_buttons)
        .replace("__MODE__", mode)
        .replace("__PLATFORM__", platform)
        .replace(
            "__NO_SCROLLBAR__",
            if config.window.no_scrollbar {
                "true"
            } else {
                "false"
            },
        )
        .trim_start()
        .to_string()
}

const SHELL_TEMPLATE: &str = r##"
<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>__PRODUCT_NAME__</title>
  <meta http-equiv="Content-Security-Policy" content="default-src 'self' https: http: data: blob:; style-src 'self' 'unsafe-inline'; img-src * data: blob:; script-src 'self' 'unsafe-inline';">
  <style>
    :root{
      --tb-bg:__TB_BG__;
      --tb-fg:__TB_FG__;
      --tb-border:__TB_BORDER__;
      --icon:__ICON_COLOR__;
      --max-offset: -7px;
    }
    html,body{height:100%;margin:0}
    body{display:flex;flex-direction:column;background:var(--tb-bg);color:var(--tb-fg)}
    .topbar{
      position: fixed;
      top: 0;
      left: 0;
      right: 0;
      height:42px;
      display:flex;
      align-items:center;
      justify-content:space-between;
      padding:0 10px;
      border-bottom:1px solid var(--tb-border);
      -webkit-app-region:drag;
      z-index: 9999;
      background: var(--tb-bg);
    }
    .group{display:flex;gap:8px}
    .btn{width:28px;height:28px;display:flex;align-items:center;justify-content:center;border:none;border-radius:8px;background:transparent;color:var(--icon);cursor:pointer;-webkit-app-region:no-drag}
    .btn:hover{background:rgba(127,127,127,0.12)}
    .btn svg{width:20px;height:20px;stroke:currentColor;fill:none;stroke-width:2}
    .btn img{width:20px;height:20px;display:block}
    #content{flex:1 1 auto; min-height:0; display:flex; margin-top:42px}
    webview{flex:1 1 auto; width:100%; height:100%}
    body.maximized .topbar {
      transform: translateY(var(--max-offset));
      box-shadow: none;
    }
    body.maximized #content {
      margin-top: calc(42px + var(--max-offset));
    }
    .topbar { padding-top: env(safe-area-inset-top); }
    body.maximized .topbar { padding-top: env(safe-area-inset-top); }
  </style>
</head>
<body>
  <div class="topbar">
    <div class="group" id="left">
      __LEFT_BUTTONS__
    </div>
    <div class="group" id="right">
      __RIGHT_BUTTONS__
    </div>
  </div>
  <div id="content">
    <webview id="wv" src="__TARGET_URL__" allowpopups partition="persist:shell"></webview>
  </div>
  <script>
    (function () {
      const PLATFORM = '__PLATFORM__';
      const MAP = { win32: '-8px', linux: '-6px', darwin: '0px' };
      try {
        const offset = MAP[PLATFORM] ?? '-6px';
        document.documentElement.style.setProperty('--max-offset', offset);
      } catch (e) {}

      const wv = document.getElementById('wv');

      const NO_SCROLLBAR = __NO_SCROLLBAR__;
      if (NO_SCROLLBAR && wv) {
        const css = `
          ::-webkit-scrollbar { display: none !important; width: 0 !important; height: 0 !important; }
          html, body { scrollbar-width: none !important; }
        `;
        const apply = () => wv.insertCSS(css).catch(() => {});
        wv.addEventListener('did-finish-load', apply);
        wv.addEventListener('dom-ready', apply);
      }

      document.getElementById('btn-back')?.addEventListener('click', () => { try { wv.canGoBack() && wv.goBack(); } catch {} });
      document.getElementById('btn-forward')?.addEventListener('click', () => { try { wv.canGoForward() && wv.goForward(); } catch {} });
      document.getElementById('btn-reload')?.addEventListener('click', () => { try { wv.reload(); } catch {} });

      document.getElementById('btn-min')?.addEventListener('click', () => window.appWindow?.control('minimize'));
      const maxBtn = document.getElementById('btn-max');
      maxBtn?.addEventListener('click', () => window.appWindow?.control('toggle-max'));
      document.getElementById('btn-close')?.addEventListener('click', () => window.appWindow?.control('close'));

      const MODE = '__MODE__';

      window.appWindow?.control('request-state');

      window.appWindow?.onState?.((s) => {
        try {
          if (s === 'maximized') document.body.classList.add('maximized');
          else document.body.classList.remove('maximized');
        } catch (e) {}

        if (!maxBtn) return;

        if (MODE === 'custom') {
          const imgEl = maxBtn.querySelector('img');
          const maxImg = maxBtn.getAttribute('data-max-img') || '';
          const restImg = maxBtn.getAttribute('data-restore-img') || '';
          if (imgEl) {
            if (s === 'maximized') {
              imgEl.src = restImg || maxImg || imgEl.src;
            } else {
              imgEl.src = maxImg || restImg || imgEl.src;
            }
          }
        } else {
          if (s === 'maximized') {
            maxBtn.innerHTML = '<svg viewBox="0 0 24 24"><rect x="7" y="9" width="10" height="10" rx="1"/><path d="M9 7h8a1 1 0 0 1 1 1v8"/></svg>';
          } else {
            maxBtn.innerHTML = '<svg viewBox="0 0 24 24"><rect x="6" y="6" width="12" height="12" rx="1"/></svg>';
          }
        }
      });

      wv?.addEventListener('new-window', (e) => window.appWindow?.openExternal?.(e.url));
    })();
  </script>
</body>
</html>
"##;
