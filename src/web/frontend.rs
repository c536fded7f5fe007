//! Embedded HTML/CSS/JS frontend for the mapledash web dashboard.
//!
//! The entire page is compiled into the binary as a string constant. It
//! mirrors the session's view from `/api/dashboard` and forwards the token
//! form and refresh control to the JSON API. The usage chart is drawn with
//! Chart.js when it loads, and with plain CSS bars otherwise.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>MapleAI Usage Dashboard</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1000px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }

/* Service strip */
.service { display: none; align-items: center; gap: 8px; font-size: 13px; }
.service.visible { display: flex; }
.dot { width: 10px; height: 10px; border-radius: 50%; background: var(--text-muted); }
.dot.active { background: var(--green); }
.dot.error { background: var(--red); }

.badge {
  display: inline-flex;
  align-items: center;
  padding: 2px 10px;
  border-radius: 12px;
  font-size: 12px;
  font-weight: 500;
  background: var(--surface);
  border: 1px solid var(--border);
}
.badge.ok { border-color: var(--green); color: var(--green); }
.badge.err { border-color: var(--red); color: var(--red); }
.badge.env { border-color: var(--cyan); color: var(--cyan); }
.badge.plan { border-color: var(--purple); color: var(--purple); }

/* Cards */
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }

/* Token form */
.token-row { display: flex; gap: 8px; }
.token-row input {
  flex: 1;
  padding: 8px 12px;
  border-radius: 6px;
  border: 1px solid var(--border);
  background: var(--bg);
  color: var(--text);
  font-family: var(--mono);
}
.saved { margin-top: 8px; color: var(--text-muted); font-family: var(--mono); font-size: 12px; }

button {
  padding: 8px 16px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: var(--surface);
  color: var(--text);
  font-size: 13px;
  cursor: pointer;
}
button.primary { background: var(--accent); border-color: var(--accent); color: #fff; }
button:hover { opacity: 0.85; }

/* Error banner */
.banner {
  display: none;
  margin-bottom: 16px;
  padding: 12px 16px;
  border-radius: var(--radius);
  border: 1px solid var(--red);
  color: var(--red);
  background: rgba(248, 81, 73, 0.08);
}
.banner.show { display: block; }

/* Key usage */
#usage { display: none; }
#usage.visible { display: block; }

.toolbar { display: flex; align-items: center; justify-content: flex-end; gap: 12px; margin-bottom: 16px; }
.status-text { font-size: 12px; color: var(--text-muted); }
.status-text.live { color: var(--green); }
.status-text.error { color: var(--red); }
.status-text.loading { color: var(--yellow); }
#refresh-btn { display: none; }
#refresh-btn.visible { display: inline-block; }
#refresh-btn.spinning .icon { display: inline-block; animation: spin 0.5s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }

.user-head { display: flex; align-items: center; gap: 10px; font-size: 18px; font-weight: 600; }
.ban { margin-top: 12px; padding: 12px; border-radius: 6px; border: 1px solid var(--red); }
.ban h3 { color: var(--red); font-size: 14px; margin-bottom: 4px; }

.stats-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
  gap: 16px;
  margin-bottom: 16px;
}
.stat-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
}
.stat-card .head { display: flex; justify-content: space-between; align-items: center; }
.stat-card .label {
  font-size: 12px;
  color: var(--text-muted);
  text-transform: uppercase;
  letter-spacing: 0.5px;
}
.stat-card .value {
  font-size: 28px;
  font-weight: 700;
  font-family: var(--mono);
  color: var(--accent);
  line-height: 1.2;
  margin: 8px 0;
}
.stat-card .value.infinite { color: var(--green); }

.progress { height: 8px; border-radius: 4px; background: var(--border); overflow: hidden; }
.progress .fill { height: 100%; background: var(--accent); transition: width 0.4s; }
.progress .fill.warning { background: var(--yellow); }
.progress .fill.critical { background: var(--red); }
.progress-text { font-size: 12px; color: var(--text-muted); margin-top: 4px; }

/* Chart */
.chart-wrap { position: relative; height: 220px; }
.css-chart { display: flex; align-items: flex-end; gap: 4px; height: 100%; }
.css-chart .bar-group { flex: 1; display: flex; flex-direction: column; align-items: center; height: 100%; justify-content: flex-end; }
.css-chart .bar { width: 100%; max-width: 28px; background: var(--accent); border-radius: 3px 3px 0 0; min-height: 2px; }
.css-chart .bar-label { font-size: 10px; color: var(--text-muted); margin-top: 6px; }

.summary { display: flex; gap: 24px; margin-top: 16px; font-size: 13px; color: var(--text-muted); }
.summary strong { color: var(--text); font-family: var(--mono); }

.endpoints { margin-top: 12px; font-family: var(--mono); font-size: 12px; color: var(--text-muted); }

.muted { color: var(--text-muted); font-size: 12px; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1><span class="logo">maple</span>dash</h1>
    <div class="service" id="service">
      <span class="dot" id="service-dot"></span>
      <span id="service-text"></span>
      <span class="badge" id="service-env"></span>
    </div>
  </header>

  <div class="banner" id="banner"></div>

  <div class="card">
    <h2>API Token</h2>
    <form class="token-row" id="token-form">
      <input id="token-input" type="password" placeholder="sk-..." autocomplete="off">
      <button type="button" id="reveal-btn">Show</button>
      <button type="submit" class="primary">Save</button>
      <button type="button" id="clear-btn">Clear</button>
    </form>
    <div class="saved" id="saved-token"></div>
  </div>

  <div id="usage">
    <div class="toolbar">
      <span class="status-text" id="status-text"></span>
      <button id="refresh-btn"><span class="icon">⟳</span> Refresh</button>
    </div>

    <div class="card" id="user-card"></div>

    <div class="stats-grid">
      <div class="stat-card" id="rpm-card"></div>
      <div class="stat-card" id="rpd-card"></div>
      <div class="stat-card">
        <div class="label">Total Requests</div>
        <div class="value" id="total-usage">-</div>
      </div>
      <div class="stat-card">
        <div class="label">Total Tokens</div>
        <div class="value" id="total-tokens">-</div>
      </div>
    </div>

    <div class="card">
      <h2>Daily API Usage</h2>
      <div class="chart-wrap" id="chart-wrap"></div>
      <div id="chart-summary"></div>
    </div>

    <div class="card" id="global-card" style="display:none">
      <h2>🌍 Global Service Statistics</h2>
      <div class="stats-grid">
        <div class="stat-card"><div class="label">Requests</div><div class="value" id="global-requests"></div></div>
        <div class="stat-card"><div class="label">Tokens</div><div class="value" id="global-tokens"></div></div>
        <div class="stat-card"><div class="label">Endpoints</div><div class="value" id="global-endpoints"></div></div>
      </div>
      <div class="endpoints" id="endpoint-list"></div>
    </div>

    <div class="muted" id="last-updated"></div>
  </div>
</div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let chartInstance = null;
let chartRevision = null;

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  return res.json();
}

function fmt(n) {
  if (n === undefined || n === null) return '-';
  return n.toLocaleString('en-US');
}

function esc(s) {
  const d = document.createElement('div');
  d.textContent = s == null ? '' : String(s);
  return d.innerHTML;
}

function el(id) { return document.getElementById(id); }

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------
function render(view) {
  renderService(view.service);
  renderBanner(view.error);
  el('saved-token').textContent = view.token_input ? 'Saved token: ' + view.token_input : '';

  el('usage').className = view.visible ? 'visible' : '';
  el('refresh-btn').classList.toggle('visible', view.refresh_visible);

  const status = el('status-text');
  status.textContent = { idle: '', loading: 'Loading...', live: 'Live', error: 'Error' }[view.status];
  status.className = 'status-text ' + view.status;

  if (view.user) renderUser(view.user);
  if (view.rpm) renderRateCard(el('rpm-card'), view.rpm);
  if (view.rpd) renderRateCard(el('rpd-card'), view.rpd);
  el('total-usage').textContent = fmt(view.total_usage);
  el('total-tokens').textContent = fmt(view.total_tokens);
  renderChart(view.chart.current);
  renderGlobal(view.global_stats);

  el('last-updated').textContent = view.last_updated
    ? 'Last updated: ' + new Date(view.last_updated).toLocaleTimeString()
    : '';
}

function renderService(service) {
  const strip = el('service');
  strip.classList.toggle('visible', service.visible);
  el('service-dot').className = 'dot ' + service.dot;
  el('service-text').textContent = service.text;
  const env = el('service-env');
  env.textContent = service.environment;
  env.className = 'badge ' + (service.offline ? 'err' : 'env');
}

function renderBanner(error) {
  const banner = el('banner');
  if (error) {
    banner.textContent = error.message;
    banner.className = 'banner show';
  } else {
    banner.className = 'banner';
  }
}

function renderUser(user) {
  let html = `<div class="user-head">👤 User: @${esc(user.username)}
    <span class="badge plan">${esc(user.plan)}</span>${user.admin ? ' 👑' : ''}</div>`;
  if (user.ban) {
    html += `<div class="ban"><h3>⛔ Account Banned</h3>
      <div><strong>Reason:</strong> ${esc(user.ban.reason)}</div>
      <div><strong>Expires:</strong> ${esc(user.ban.expires)}</div></div>`;
  }
  el('user-card').innerHTML = html;
}

function renderRateCard(target, card) {
  const badgeClass = card.infinite ? 'ok' : (card.badge_limited ? 'err' : '');
  let html = `<div class="head"><span class="label">${esc(card.kind === 'rpm' ? 'Requests / Minute' : 'Requests / Day')}</span>
    <span class="badge ${badgeClass}">${esc(card.badge_text)}</span></div>
    <div class="value${card.infinite ? ' infinite' : ''}">${esc(card.value_text)}</div>`;
  if (card.progress) {
    html += `<div class="progress"><div class="fill ${card.progress.severity}"
      style="width:${card.progress.fill_width}%"></div></div>
      <div class="progress-text">${card.progress.percentage.toFixed(1)}% used</div>`;
  }
  target.innerHTML = html;
}

function renderChart(chart) {
  const wrap = el('chart-wrap');
  const summary = el('chart-summary');
  if (!chart) {
    destroyChart();
    wrap.innerHTML = '';
    summary.innerHTML = '';
    return;
  }
  if (chart.revision === chartRevision) return;

  // Each revision is a new chart: the old instance and summary go first.
  destroyChart();
  chartRevision = chart.revision;

  if (window.Chart) {
    wrap.innerHTML = '<canvas id="usage-chart"></canvas>';
    chartInstance = new Chart(el('usage-chart'), {
      type: 'line',
      data: {
        labels: chart.labels,
        datasets: [{
          label: 'Requests',
          data: chart.data,
          borderColor: '#58a6ff',
          backgroundColor: 'rgba(88, 166, 255, 0.15)',
          fill: true,
          tension: 0.3,
        }],
      },
      options: {
        responsive: true,
        maintainAspectRatio: false,
        plugins: { legend: { display: false } },
        scales: {
          x: { ticks: { color: '#8b949e' }, grid: { color: '#30363d' } },
          y: { beginAtZero: true, ticks: { color: '#8b949e' }, grid: { color: '#30363d' } },
        },
      },
    });
  } else {
    const max = Math.max(...chart.data, 1);
    wrap.innerHTML = '<div class="css-chart">' + chart.data.map((v, i) => `
      <div class="bar-group" title="${esc(chart.labels[i])}: ${fmt(v)}">
        <div class="bar" style="height:${Math.max((v / max) * 100, 2)}%"></div>
        <div class="bar-label">${esc(chart.labels[i])}</div>
      </div>`).join('') + '</div>';
  }

  const s = chart.summary;
  summary.innerHTML = s ? `<div class="summary">
      <span>Total: <strong>${fmt(s.total)}</strong></span>
      <span>Average: <strong>${s.average.toFixed(1)}</strong></span>
      <span>Max: <strong>${fmt(s.max)}</strong></span>
      <span>Trend: <strong>${s.trend === 'up' ? '📈' : '📉'}</strong></span>
    </div>` : '';
}

function destroyChart() {
  if (chartInstance) {
    chartInstance.destroy();
    chartInstance = null;
  }
  chartRevision = null;
}

function renderGlobal(stats) {
  const card = el('global-card');
  if (!stats) {
    card.style.display = 'none';
    return;
  }
  card.style.display = 'block';
  el('global-requests').textContent = fmt(stats.total_requests);
  el('global-tokens').textContent = fmt(stats.total_tokens);
  el('global-endpoints').textContent = fmt(stats.endpoint_count);
  el('endpoint-list').innerHTML = stats.endpoints.map(e => `<div>${esc(e)}</div>`).join('');
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------
async function loadDashboard() {
  try {
    render(await api('GET', '/api/dashboard'));
  } catch (e) {
    renderBanner({ message: 'Failed to fetch: ' + e.message });
  }
}

el('token-form').addEventListener('submit', async ev => {
  ev.preventDefault();
  const input = el('token-input');
  const res = await api('POST', '/api/token', { token: input.value });
  if (res.success) input.value = '';
  if (res.dashboard) render(res.dashboard);
  else if (res.error) renderBanner({ message: res.error });
});

el('clear-btn').addEventListener('click', async () => {
  const res = await api('DELETE', '/api/token');
  el('token-input').value = '';
  if (res.dashboard) render(res.dashboard);
});

el('reveal-btn').addEventListener('click', () => {
  const input = el('token-input');
  const hidden = input.type === 'password';
  input.type = hidden ? 'text' : 'password';
  el('reveal-btn').textContent = hidden ? 'Hide' : 'Show';
});

el('refresh-btn').addEventListener('click', async () => {
  const btn = el('refresh-btn');
  btn.classList.add('spinning');
  setTimeout(() => btn.classList.remove('spinning'), 500);
  const res = await api('POST', '/api/refresh');
  if (res.dashboard) render(res.dashboard);
});

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
loadDashboard();
setInterval(loadDashboard, 2000);
</script>
</body>
</html>
"##;
