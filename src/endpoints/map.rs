pub(super) const INDEX_HTML: &str = r#"<!DOCTYPE html>
  <html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
    <title>StacYolo</title>
    <link rel="stylesheet" href="https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.css" />
    <style>
      html, body { height: 100%; margin: 0; padding: 0; font-family: sans-serif; font-size: 13px; }
      #sidebar {
        position: absolute; top: 0; left: 0; bottom: 0; width: 340px;
        overflow-y: auto; background: white; box-shadow: 1px 0 4px rgba(0,0,0,0.3);
        padding: 8px; box-sizing: border-box; z-index: 2;
      }
      #map { position: absolute; top: 0; bottom: 0; left: 340px; right: 0; }
      #map-controls {
        position: absolute; top: 12px; right: 12px; z-index: 3; background: white;
        padding: 6px; border-radius: 4px; box-shadow: 0 1px 4px rgba(0,0,0,0.3);
        min-width: 200px; display: none;
      }
      #map-controls.minimized #layer-controls-container { display: none; }
      #loading {
        position: absolute; top: 12px; left: 50%; z-index: 3; background: white;
        padding: 6px 12px; border-radius: 4px; box-shadow: 0 1px 4px rgba(0,0,0,0.3);
      }
      #toast {
        position: absolute; bottom: 20px; left: 50%; z-index: 4; background: #333; color: white;
        padding: 6px 12px; border-radius: 4px; opacity: 0; transition: opacity 0.3s;
      }
      #toast.show { opacity: 1; }
      .result-item { display: flex; gap: 6px; border-bottom: 1px solid #eee; padding: 6px 0; }
      .result-item img { width: 72px; height: 72px; object-fit: cover; }
      .result-title { font-weight: bold; word-break: break-all; }
      button.active, button.selected { background: #088; color: white; }
      .window-field { display: flex; gap: 4px; margin: 2px 0; }
      .window-field input { flex: 1; }
      #filters-header { cursor: pointer; font-weight: bold; }
    </style>
  </head>
  <body>
    <div id="sidebar">
      <div id="selection-info">Click a grid cell to search for imagery</div>
      <div id="filters-header">Filters <span id="filters-toggle-icon">▾</span></div>
      <div id="search-form">
        <label>Start date <input type="date" id="start-date" /></label><br />
        <label>End date <input type="date" id="end-date" /></label><br />
        <label>Max cloud cover (%) <input type="number" id="cloud-cover" min="0" max="100" /></label>
      </div>
      <div class="window-field">
        <label for="window-a">Win A</label>
        <input id="window-a" readonly />
        <button data-copy="window-a">Copy</button>
      </div>
      <div class="window-field">
        <label for="window-b">Win B</label>
        <input id="window-b" readonly />
        <button data-copy="window-b">Copy</button>
      </div>
      <div id="search-status"></div>
      <div id="search-results"></div>
      <button id="next-page-btn" disabled>Load more</button>
    </div>

    <div id="map"></div>
    <div id="map-controls" class="minimized">
      <div id="map-controls-header"><button id="map-controls-toggle">Layers</button></div>
      <div id="layer-controls-container"></div>
    </div>
    <div id="loading">Loading S2 grid...</div>
    <div id="toast"></div>

    <script src="https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.js"></script>
    <script>
      const BASEMAP_TILES = __BASEMAP_TILES__;

      const map = new maplibregl.Map({
        container: 'map',
        style: {
          version: 8,
          sources: {
            'sentinel-cloudless': {
              type: 'raster',
              tiles: [BASEMAP_TILES],
              tileSize: 256,
              attribution: 'Sentinel-2 cloudless imagery by <a href="https://eox.at">EOX</a>'
            }
          },
          layers: [
            { id: 'sentinel-cloudless-layer', type: 'raster', source: 'sentinel-cloudless', minzoom: 0, maxzoom: 18 }
          ]
        },
        center: [0, 0],
        zoom: 2
      });

      const el = (id) => document.getElementById(id);
      let state = null;

      // Replay server-side map commands in order
      function applyCommands(commands) {
        for (const cmd of commands) {
          try {
            switch (cmd.op) {
              case 'addSource': map.addSource(cmd.id, cmd.source); break;
              case 'removeSource': if (map.getSource(cmd.id)) map.removeSource(cmd.id); break;
              case 'addLayer': map.addLayer(cmd.layer); break;
              case 'removeLayer': if (map.getLayer(cmd.id)) map.removeLayer(cmd.id); break;
              case 'setPaintProperty': map.setPaintProperty(cmd.layer, cmd.name, cmd.value); break;
              case 'setLayoutProperty': map.setLayoutProperty(cmd.layer, cmd.name, cmd.value); break;
              case 'fitBounds': map.fitBounds(cmd.bounds, cmd.options); break;
            }
          } catch (e) {
            console.error('map command failed', cmd, e);
          }
        }
      }

      async function send(action) {
        const res = await fetch('/api/actions', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify(action)
        });
        if (!res.ok) {
          el('search-status').textContent = `Request failed: ${res.status}`;
          return;
        }
        apply(await res.json());
      }

      function apply(update) {
        applyCommands(update.commands);
        state = update.state;
        render();
      }

      function button(text, cls, active, onClick) {
        const b = document.createElement('button');
        b.textContent = text;
        b.className = cls + (active ? (cls.startsWith('win') ? ' selected' : ' active') : '');
        b.addEventListener('click', onClick);
        return b;
      }

      function renderResults(results) {
        const list = el('search-results');
        list.innerHTML = '';
        for (const item of results.items) {
          const row = document.createElement('div');
          row.className = 'result-item';

          if (item.preview_url) {
            const img = document.createElement('img');
            img.src = item.preview_url;
            img.alt = 'Preview';
            img.onerror = () => { img.style.display = 'none'; };
            row.appendChild(img);
          }

          const info = document.createElement('div');
          const title = document.createElement('div');
          title.className = 'result-title';
          title.textContent = item.id;
          info.appendChild(title);
          info.appendChild(document.createTextNode(`Date: ${item.date ?? 'N/A'}`));
          info.appendChild(document.createElement('br'));
          info.appendChild(document.createTextNode(`Cloud cover: ${item.cloud_cover}%`));
          info.appendChild(document.createElement('br'));

          const link = document.createElement('a');
          link.href = item.self_link ?? '#';
          link.target = '_blank';
          link.textContent = 'View STAC Item';
          info.appendChild(link);
          info.appendChild(document.createElement('br'));

          info.appendChild(button(item.viewing ? 'Viewing' : 'View on Map', 'view-map-btn', item.viewing,
            () => send({ type: 'view_item', item_id: item.id })));
          info.appendChild(button(item.window_a ? 'Selected' : 'Win A', 'win-btn win-a-btn', item.window_a,
            () => send({ type: 'toggle_window', window: 'a', item_id: item.id })));
          info.appendChild(button(item.window_b ? 'Selected' : 'Win B', 'win-btn win-b-btn', item.window_b,
            () => send({ type: 'toggle_window', window: 'b', item_id: item.id })));

          row.appendChild(info);
          list.appendChild(row);
        }
        el('search-status').textContent = results.status;
        el('next-page-btn').disabled = !results.load_more_enabled;
      }

      function buildLayerControl(control) {
        const item = document.createElement('div');
        item.dataset.slot = control.slot;
        const checkbox = document.createElement('input');
        checkbox.type = 'checkbox';
        checkbox.addEventListener('change', () =>
          send({ type: 'set_visible', slot: control.slot, visible: checkbox.checked }));
        const label = document.createElement('label');
        label.textContent = ' ' + control.label;

        const slider = document.createElement('input');
        slider.type = 'range';
        slider.min = '0';
        slider.max = '1';
        slider.step = '0.1';
        slider.value = String(control.opacity);
        let pending = null;
        const sendOpacity = () => {
          clearTimeout(pending);
          send({ type: 'set_opacity', slot: control.slot, opacity: parseFloat(slider.value) });
        };
        // live while dragging, debounced
        slider.addEventListener('input', () => {
          clearTimeout(pending);
          pending = setTimeout(sendOpacity, 50);
        });
        slider.addEventListener('change', sendOpacity);

        item.appendChild(checkbox);
        item.appendChild(label);
        item.appendChild(document.createElement('br'));
        item.appendChild(document.createTextNode('Opacity: '));
        item.appendChild(slider);
        return item;
      }

      function renderLayerControls() {
        const container = el('layer-controls-container');
        // rows are rebuilt only when the set of active slots changes, so a
        // slider keeps its drag across responses
        const slots = state.layer_controls.map((c) => c.slot).join(',');
        if (container.dataset.slots !== slots) {
          container.innerHTML = '';
          for (const control of state.layer_controls) {
            container.appendChild(buildLayerControl(control));
          }
          container.dataset.slots = slots;
        }
        for (const control of state.layer_controls) {
          const item = container.querySelector(`[data-slot="${control.slot}"]`);
          item.querySelector('input[type=checkbox]').checked = control.visible;
          const slider = item.querySelector('input[type=range]');
          if (document.activeElement !== slider) slider.value = String(control.opacity);
        }
        const controls = el('map-controls');
        controls.style.display = state.controls_visible ? 'block' : 'none';
        controls.classList.toggle('minimized', state.controls_minimized);
      }

      function renderGridStatus() {
        const loading = el('loading');
        switch (state.grid.state) {
          case 'loading': loading.style.display = 'block'; break;
          case 'ready': loading.style.display = 'none'; break;
          case 'failed':
            loading.textContent = state.grid.message;
            loading.style.display = 'block';
            setTimeout(() => { loading.style.display = 'none'; }, state.grid.hide_after_ms);
            break;
        }
      }

      function render() {
        renderGridStatus();
        renderResults(state.results);
        renderLayerControls();

        if (state.selection) {
          el('selection-info').innerHTML = '';
          const strong = document.createElement('strong');
          strong.textContent = 'Selected Grid Cell:';
          el('selection-info').append(strong, ' ' + state.selection.cell_id);
        }
        el('window-a').value = state.window_a ?? '';
        el('window-b').value = state.window_b ?? '';

        const visible = state.preferences.filtersVisible;
        el('search-form').style.display = visible ? 'block' : 'none';
        el('filters-toggle-icon').style.transform = visible ? 'rotate(180deg)' : 'rotate(0deg)';
      }

      function currentFilters() {
        const cloud = parseFloat(el('cloud-cover').value);
        return {
          start_date: el('start-date').value || null,
          end_date: el('end-date').value || null,
          max_cloud_cover: Number.isFinite(cloud) ? cloud : 10
        };
      }

      for (const id of ['start-date', 'end-date', 'cloud-cover']) {
        el(id).addEventListener('change', () => send({ type: 'set_filters', filters: currentFilters() }));
      }
      el('next-page-btn').addEventListener('click', () => send({ type: 'load_more' }));
      el('filters-header').addEventListener('click', () => send({ type: 'toggle_filters' }));
      el('map-controls-toggle').addEventListener('click', () => send({ type: 'toggle_map_controls' }));

      document.querySelectorAll('[data-copy]').forEach((b) => {
        b.addEventListener('click', () => {
          const text = el(b.dataset.copy).value;
          if (!text) return;
          navigator.clipboard.writeText(text).then(() => {
            const toast = el('toast');
            toast.textContent = 'Copied to clipboard';
            toast.classList.add('show');
            setTimeout(() => toast.classList.remove('show'), 2000);
          }).catch((err) => console.error('Failed to copy text: ', err));
        });
      });

      async function pollGrid() {
        while (state && state.grid.state === 'loading') {
          await new Promise((r) => setTimeout(r, 1000));
          const res = await fetch('/api/updates');
          apply(await res.json());
        }
      }

      map.on('load', async () => {
        const res = await fetch('/api/state');
        apply(await res.json());
        el('cloud-cover').value = state.filters.max_cloud_cover;

        map.on('click', 's2-grid-fill', (e) => {
          const lngLat = e.lngLat.wrap();
          el('search-status').textContent = 'Searching...';
          send({ type: 'select_cell', lon: lngLat.lng, lat: lngLat.lat });
        });
        map.on('mouseenter', 's2-grid-fill', () => { map.getCanvas().style.cursor = 'pointer'; });
        map.on('mouseleave', 's2-grid-fill', () => { map.getCanvas().style.cursor = ''; });

        pollGrid().catch(console.error);
      });
    </script>
  </body>
  </html>
"#;
