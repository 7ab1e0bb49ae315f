use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>QR Code Generator and Decoder</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
            background-color: #282828;
            color: white;
        }
        h1 {
            text-align: center;
        }
        .tabs {
            display: flex;
            gap: 4px;
            border-bottom: 2px solid #303030;
        }
        .tab {
            background-color: #303030;
            color: white;
            border: none;
            padding: 10px 20px;
            cursor: pointer;
            font-size: 16px;
        }
        .tab.selected {
            border-bottom: 2px solid white;
        }
        .panel {
            display: none;
            flex-direction: column;
            gap: 12px;
            padding: 20px 0;
        }
        .panel.active {
            display: flex;
        }
        textarea {
            min-height: 140px;
            background-color: #1e1e1e;
            color: white;
            border: 1px solid #444;
            padding: 10px;
            font-size: 15px;
        }
        .button {
            background-color: #3498db;
            color: white;
            border: none;
            padding: 10px 15px;
            border-radius: 4px;
            cursor: pointer;
            font-size: 16px;
        }
        .button:hover {
            background-color: #2980b9;
        }
        .button:disabled {
            background-color: #555;
            cursor: default;
        }
        .hidden {
            display: none !important;
        }
        .drop-area {
            border: 2px dashed #aaaaaa;
            border-radius: 8px;
            padding: 100px 20px;
            text-align: center;
            cursor: pointer;
            user-select: none;
        }
        .drop-area.active {
            border-color: #3498db;
            background-color: #303030;
        }
        .result {
            white-space: pre-wrap;
            min-height: 1.5em;
        }
        .qr-image {
            align-self: center;
            max-width: 100%;
            image-rendering: pixelated;
        }
        .row {
            display: flex;
            gap: 10px;
            justify-content: flex-end;
        }
        video {
            align-self: center;
            max-width: 100%;
        }
        .wifi-list {
            list-style: none;
            padding: 0;
            margin: 0;
            border: 1px solid #444;
            min-height: 120px;
        }
        .wifi-list li {
            padding: 8px 12px;
            cursor: pointer;
        }
        .wifi-list li.selected {
            background-color: #3498db;
        }
        #file-input {
            display: none;
        }
    </style>
</head>
<body>
    <h1>QR Code Generator and Decoder</h1>
    <div class="tabs">
        <button class="tab selected" data-panel="encode">Encode</button>
        <button class="tab" data-panel="decode">Decode</button>
        <button class="tab" data-panel="wifi">Wi-Fi Sharing</button>
    </div>

    <div class="panel active" id="encode">
        <textarea id="encode-input" placeholder="Enter text here..."></textarea>
        <button class="button" id="generate-button">Generate QR Code</button>
        <img class="qr-image hidden" id="generated-picture" alt="Generated QR code">
        <button class="button hidden" id="copy-button">Copy Image</button>
        <div class="result" id="encode-result"></div>
    </div>

    <div class="panel" id="decode">
        <div class="drop-area" id="drop-area">Drag an image here or double-click to upload a file</div>
        <input type="file" id="file-input" accept="image/png,image/jpeg,image/bmp">
        <div class="result" id="result-label"></div>
        <button class="button hidden" id="pause-button" disabled>Pause</button>
        <button class="button hidden" id="resume-button" disabled>Resume</button>
        <div class="row">
            <button class="button" id="camera-button">Use Camera</button>
        </div>
        <video id="video" class="hidden" autoplay playsinline muted></video>
        <canvas id="frame-canvas" class="hidden"></canvas>
    </div>

    <div class="panel" id="wifi">
        <button class="button" id="fetch-wifi-button">Fetch Wi-Fi Networks</button>
        <ul class="wifi-list" id="wifi-list"></ul>
        <button class="button" id="share-wifi-button">Share Wi-Fi Password as QR Code</button>
        <div class="result" id="wifi-result"></div>
        <img class="qr-image hidden" id="wifi-picture" alt="Wi-Fi QR code">
    </div>

    <script>
        async function apiError(response) {
            try {
                const body = await response.json();
                return body.error || response.statusText;
            } catch (_) {
                return response.statusText;
            }
        }

        async function copyText(text) {
            try {
                await navigator.clipboard.writeText(text);
            } catch (error) {
                console.error('Clipboard unavailable:', error);
            }
        }

        // Tabs
        document.querySelectorAll('.tab').forEach(tab => {
            tab.addEventListener('click', () => {
                document.querySelectorAll('.tab').forEach(t => t.classList.remove('selected'));
                document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
                tab.classList.add('selected');
                document.getElementById(tab.dataset.panel).classList.add('active');
            });
        });

        // Encode
        const generatedPicture = document.getElementById('generated-picture');
        const copyButton = document.getElementById('copy-button');
        const encodeResult = document.getElementById('encode-result');

        document.getElementById('generate-button').addEventListener('click', async () => {
            const data = document.getElementById('encode-input').value;
            if (!data.trim()) {
                return;
            }
            const response = await fetch('/api/encode', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ data })
            });
            if (!response.ok) {
                encodeResult.textContent = await apiError(response);
                return;
            }
            const generated = await response.json();
            generatedPicture.src = `/api/qr/${generated.id}`;
            generatedPicture.classList.remove('hidden');
            copyButton.classList.remove('hidden');
            encodeResult.textContent = `Saved as ${generated.name}`;
        });

        copyButton.addEventListener('click', async () => {
            try {
                const blob = await (await fetch(generatedPicture.src)).blob();
                await navigator.clipboard.write([new ClipboardItem({ 'image/png': blob })]);
                encodeResult.textContent = 'Image copied to clipboard.';
            } catch (error) {
                encodeResult.textContent = 'Copying images is not supported by this browser.';
            }
        });

        // Decode
        const dropArea = document.getElementById('drop-area');
        const fileInput = document.getElementById('file-input');
        const resultLabel = document.getElementById('result-label');
        const pauseButton = document.getElementById('pause-button');
        const resumeButton = document.getElementById('resume-button');
        const cameraButton = document.getElementById('camera-button');
        const video = document.getElementById('video');
        const canvas = document.getElementById('frame-canvas');
        let stream = null;
        let paused = false;
        let scanning = false;

        function setPaused(value) {
            paused = value;
            pauseButton.disabled = value;
            resumeButton.disabled = !value;
        }

        async function decodeBlob(blob) {
            const form = new FormData();
            form.append('image', blob, 'image.png');
            const response = await fetch('/api/decode', { method: 'POST', body: form });
            if (!response.ok) {
                resultLabel.textContent = await apiError(response);
                return null;
            }
            return response.json();
        }

        async function showReport(report) {
            resultLabel.textContent = report.message;
            const text = report.wifi ? report.wifi.password : (report.codes.length ? report.codes[report.codes.length - 1].content : null);
            if (text) {
                await copyText(text);
            }
        }

        async function decodeFile(file) {
            if (!file) {
                resultLabel.textContent = 'No QR Code detected.';
                return;
            }
            setPaused(true);
            const report = await decodeBlob(file);
            if (report) {
                await showReport(report);
            }
        }

        dropArea.addEventListener('dblclick', () => fileInput.click());
        fileInput.addEventListener('change', () => decodeFile(fileInput.files[0]));
        dropArea.addEventListener('dragover', (e) => {
            e.preventDefault();
            dropArea.classList.add('active');
        });
        dropArea.addEventListener('dragleave', () => dropArea.classList.remove('active'));
        dropArea.addEventListener('drop', (e) => {
            e.preventDefault();
            dropArea.classList.remove('active');
            if (e.dataTransfer.files.length === 1) {
                decodeFile(e.dataTransfer.files[0]);
            }
        });

        async function scanFrame() {
            if (!stream || paused || scanning || video.videoWidth === 0) {
                return;
            }
            scanning = true;
            try {
                canvas.width = video.videoWidth;
                canvas.height = video.videoHeight;
                canvas.getContext('2d').drawImage(video, 0, 0);
                const blob = await new Promise(resolve => canvas.toBlob(resolve, 'image/png'));
                const report = blob ? await decodeBlob(blob) : null;
                if (report && report.codes.length > 0) {
                    setPaused(true);
                    await showReport(report);
                }
            } finally {
                scanning = false;
            }
        }

        cameraButton.addEventListener('click', async () => {
            if (stream) {
                setPaused(false);
                return;
            }
            try {
                stream = await navigator.mediaDevices.getUserMedia({ video: { facingMode: 'environment' } });
            } catch (error) {
                alert('Error: Unable to open camera.');
                return;
            }
            video.srcObject = stream;
            video.classList.remove('hidden');
            pauseButton.classList.remove('hidden');
            resumeButton.classList.remove('hidden');
            setPaused(false);
            setInterval(scanFrame, 100);
        });

        pauseButton.addEventListener('click', () => setPaused(true));
        resumeButton.addEventListener('click', () => setPaused(false));

        // Wi-Fi sharing
        const wifiList = document.getElementById('wifi-list');
        const wifiResult = document.getElementById('wifi-result');
        const wifiPicture = document.getElementById('wifi-picture');

        document.getElementById('fetch-wifi-button').addEventListener('click', async () => {
            const response = await fetch('/api/wifi/networks');
            if (!response.ok) {
                alert(`Error fetching Wi-Fi networks: ${await apiError(response)}`);
                return;
            }
            const names = await response.json();
            wifiList.innerHTML = '';
            names.forEach(name => {
                const item = document.createElement('li');
                item.textContent = name;
                item.addEventListener('click', () => {
                    wifiList.querySelectorAll('li').forEach(li => li.classList.remove('selected'));
                    item.classList.add('selected');
                });
                wifiList.appendChild(item);
            });
            wifiResult.textContent = names.length ? '' : 'No saved Wi-Fi networks found.';
        });

        document.getElementById('share-wifi-button').addEventListener('click', async () => {
            const selected = wifiList.querySelector('li.selected');
            if (!selected) {
                return;
            }
            const response = await fetch('/api/wifi/share', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ name: selected.textContent })
            });
            if (!response.ok) {
                wifiResult.textContent = await apiError(response);
                wifiPicture.classList.add('hidden');
                return;
            }
            const blob = await response.blob();
            if (wifiPicture.src.startsWith('blob:')) {
                URL.revokeObjectURL(wifiPicture.src);
            }
            wifiPicture.src = URL.createObjectURL(blob);
            wifiPicture.classList.remove('hidden');
            wifiResult.textContent = `Scan to join ${selected.textContent}`;
        });
    </script>
</body>
</html>
"#;

/// Serve the single-page interface for every non-API path.
pub async fn serve_index() -> impl IntoResponse {
    Html(INDEX_HTML)
}
