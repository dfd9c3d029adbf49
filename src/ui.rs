//! Thin presentation layer: two inline-HTML pages driven by the JSON API.
//! All state logic lives server-side and in the client stores; the pages
//! only render and forward clicks.

pub fn render_dashboard() -> String {
    DASHBOARD_HTML.to_string()
}

pub const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Routine — Sign in</title>
  <style>
    body { font-family: system-ui, sans-serif; background: #f5f4f0; color: #2b2a28;
           display: grid; place-items: center; min-height: 100vh; margin: 0; }
    .card { background: white; border-radius: 14px; padding: 32px; width: min(360px, 90vw);
            box-shadow: 0 12px 32px rgba(47, 72, 88, 0.12); display: grid; gap: 14px; }
    h1 { margin: 0; font-size: 1.5rem; }
    input, button { font: inherit; padding: 10px 12px; border-radius: 8px; }
    input { border: 1px solid #cfcac2; }
    button { border: none; background: #2f4858; color: white; cursor: pointer; }
    .status { color: #c63b2b; min-height: 1.2em; font-size: 0.9rem; }
  </style>
</head>
<body>
  <main class="card">
    <h1>Routine</h1>
    <p>Sign in with your email to reach your dashboard.</p>
    <input id="email" type="email" placeholder="you@example.com" autocomplete="email" />
    <button id="go">Sign in</button>
    <div class="status" id="status"></div>
  </main>
  <script>
    const go = async () => {
      const email = document.getElementById('email').value.trim();
      const res = await fetch('/api/auth/login', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ email })
      });
      if (!res.ok) {
        const body = await res.json().catch(() => ({}));
        document.getElementById('status').textContent = body.error || 'Sign in failed';
        return;
      }
      window.location.href = '/';
    };
    document.getElementById('go').addEventListener('click', go);
    document.getElementById('email').addEventListener('keydown', (e) => {
      if (e.key === 'Enter') go();
    });
  </script>
</body>
</html>
"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Routine — Dashboard</title>
  <style>
    body { font-family: system-ui, sans-serif; background: #f5f4f0; color: #2b2a28;
           margin: 0; padding: 24px; }
    main { max-width: 960px; margin: 0 auto; display: grid; gap: 20px; }
    section { background: white; border-radius: 14px; padding: 20px;
              box-shadow: 0 10px 24px rgba(47, 72, 88, 0.08); }
    h1 { margin: 0 0 4px; } h2 { margin: 0 0 12px; font-size: 1.1rem; }
    table { width: 100%; border-collapse: collapse; font-size: 0.95rem; }
    th, td { text-align: center; padding: 6px 4px; border-bottom: 1px solid #eee; }
    td.name { text-align: left; }
    button { border: none; border-radius: 6px; padding: 4px 9px; cursor: pointer;
             background: #eef0f2; font: inherit; }
    button.primary { background: #2f4858; color: white; padding: 8px 14px; }
    .day button { margin: 0 2px; }
    .stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); gap: 12px; }
    .stat .label { font-size: 0.8rem; color: #8b857d; text-transform: uppercase; }
    .stat .value { font-size: 1.4rem; font-weight: 600; }
    form { display: flex; flex-wrap: wrap; gap: 8px; }
    input { font: inherit; padding: 7px 10px; border: 1px solid #cfcac2; border-radius: 8px; }
    .status { color: #c63b2b; min-height: 1.2em; font-size: 0.9rem; }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>Routine</h1>
      <p>Weekly points against target, Monday-start week.</p>
    </header>

    <section>
      <h2>Routines</h2>
      <table>
        <thead>
          <tr>
            <th class="name">Name</th><th>AP</th><th>APW</th>
            <th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th><th>Fri</th><th>Sat</th><th>Sun</th>
            <th>WR</th><th></th>
          </tr>
        </thead>
        <tbody id="rows"></tbody>
      </table>
      <form id="add">
        <input id="new-name" placeholder="New routine" required />
        <input id="new-ap" type="number" min="1" value="1" required style="width:70px" />
        <button class="primary" type="submit">Add</button>
      </form>
    </section>

    <section>
      <h2>Weekly stats</h2>
      <div class="stats" id="stats"></div>
    </section>

    <section>
      <h2>Settings</h2>
      <form id="settings">
        <label>Available days <input id="s-available" type="number" min="1" max="7" style="width:60px" /></label>
        <label>Work days <input id="s-work" type="number" min="1" max="7" style="width:60px" /></label>
        <label>Hours/day <input id="s-hours" type="number" min="1" max="24" style="width:60px" /></label>
        <button class="primary" type="submit">Save</button>
      </form>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const DAYS = ['monday', 'tuesday', 'wednesday', 'thursday', 'friday', 'saturday', 'sunday'];
    const statusEl = document.getElementById('status');
    const setStatus = (msg) => { statusEl.textContent = msg || ''; };

    const api = async (path, options) => {
      const res = await fetch(path, options);
      const body = await res.json().catch(() => ({}));
      if (!res.ok) throw new Error(body.error || 'Request failed');
      return body.data;
    };

    const renderRoutines = (routines) => {
      const rows = document.getElementById('rows');
      rows.innerHTML = '';
      for (const r of routines) {
        const tr = document.createElement('tr');
        const wd = r.weekly_data;
        const wr = wd ? DAYS.reduce((sum, d) => sum + wd[d], 0) : 0;
        const cells = [
          `<td class="name">${r.name}</td>`, `<td>${r.daily_average}</td>`, `<td>${r.apw ?? ''}</td>`
        ];
        for (const d of DAYS) {
          const value = wd ? wd[d] : 0;
          cells.push(`<td class="day">${value}
            <button data-id="${r.id}" data-day="${d}" data-op="increment">+</button>
            <button data-id="${r.id}" data-day="${d}" data-op="decrement">&minus;</button></td>`);
        }
        cells.push(`<td>${wr}</td>`);
        cells.push(`<td><button data-id="${r.id}" data-op="delete">&times;</button></td>`);
        tr.innerHTML = cells.join('');
        rows.appendChild(tr);
      }
    };

    const renderStats = (payload) => {
      const { totals, week } = payload;
      const items = [
        ['Total AP', totals.total_ap], ['Total APW', totals.total_apw],
        ['Total WR', totals.total_wr], ['Off hours (daily)', week.off_hours_daily + 'h'],
        ['Work hours (week)', week.work_hours_week + 'h'],
        ['Capacity left', week.capacity_left], ['Avg per day', week.avg_per_day]
      ];
      document.getElementById('stats').innerHTML = items
        .map(([label, value]) => `<div class="stat"><div class="label">${label}</div><div class="value">${value}</div></div>`)
        .join('');
    };

    const refresh = async () => {
      const [routines, stats, settings] = await Promise.all([
        api('/api/routines'), api('/api/stats'), api('/api/settings')
      ]);
      renderRoutines(routines);
      renderStats(stats);
      document.getElementById('s-available').value = settings.available_days;
      document.getElementById('s-work').value = settings.work_days;
      document.getElementById('s-hours').value = settings.work_hours_day;
    };

    document.getElementById('rows').addEventListener('click', async (event) => {
      const btn = event.target.closest('button');
      if (!btn) return;
      const { id, day, op } = btn.dataset;
      try {
        if (op === 'delete') {
          await api(`/api/routines/${id}`, { method: 'DELETE' });
        } else {
          await api(`/api/weekly-data/${id}/${op}`, {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ day })
          });
        }
        setStatus('');
        await refresh();
      } catch (err) { setStatus(err.message); }
    });

    document.getElementById('add').addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        await api('/api/routines', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({
            name: document.getElementById('new-name').value,
            daily_average: Number(document.getElementById('new-ap').value)
          })
        });
        document.getElementById('new-name').value = '';
        setStatus('');
        await refresh();
      } catch (err) { setStatus(err.message); }
    });

    document.getElementById('settings').addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        await api('/api/settings', {
          method: 'PATCH',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({
            available_days: Number(document.getElementById('s-available').value),
            work_days: Number(document.getElementById('s-work').value),
            work_hours_day: Number(document.getElementById('s-hours').value)
          })
        });
        setStatus('');
        await refresh();
      } catch (err) { setStatus(err.message); }
    });

    refresh().catch((err) => setStatus(err.message));
  </script>
</body>
</html>
"#;
