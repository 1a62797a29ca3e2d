//! Embedded single-page UI, served when no prebuilt bundle is present.

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Can I Park Here?</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #f9fafb;
            min-height: 100vh;
            padding: 16px;
        }

        .container {
            max-width: 28rem;
            margin: 0 auto;
        }

        h1 {
            text-align: center;
            font-size: 1.5em;
            margin-bottom: 24px;
        }

        .gallery {
            display: flex;
            gap: 16px;
            overflow-x: auto;
            padding-top: 8px;
            margin-bottom: 24px;
        }

        .thumb {
            position: relative;
            flex: none;
        }

        .thumb img {
            height: 160px;
            width: 160px;
            object-fit: cover;
            border-radius: 8px;
        }

        .thumb button {
            position: absolute;
            top: -8px;
            right: -8px;
            width: 24px;
            height: 24px;
            border: none;
            border-radius: 50%;
            background: #ef4444;
            color: white;
            cursor: pointer;
        }

        .controls {
            display: flex;
            gap: 16px;
            margin-bottom: 24px;
        }

        .btn {
            flex: 1;
            border: none;
            border-radius: 8px;
            padding: 16px;
            color: white;
            font-size: 1em;
            cursor: pointer;
        }

        .btn-camera { background: #3b82f6; }
        .btn-upload { background: #6b7280; }

        .btn-analyze {
            width: 100%;
            background: #22c55e;
            margin-bottom: 24px;
        }

        .btn:disabled { opacity: 0.5; }

        input[type="file"] { display: none; }

        .result {
            background: white;
            border-radius: 8px;
            padding: 24px;
            box-shadow: 0 10px 15px rgba(0,0,0,0.1);
        }

        .verdict-head {
            display: flex;
            align-items: center;
            gap: 12px;
            margin-bottom: 16px;
        }

        .icon { font-size: 1.5em; }
        .icon.allowed { color: #22c55e; }
        .icon.denied { color: #ef4444; }

        .explanation { color: #4b5563; margin-bottom: 16px; }
        .restrictions { margin-bottom: 16px; }
        .restrictions ul { padding-left: 20px; color: #4b5563; }
        .time-limit { font-size: 0.875em; color: #6b7280; }

        .error {
            background: #fee2e2;
            color: #b91c1c;
            border-radius: 8px;
            padding: 16px;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>Can I Park Here?</h1>

        <div class="gallery" id="gallery"></div>

        <div class="controls">
            <button class="btn btn-camera" id="cameraButton">📷 Take Photo</button>
            <button class="btn btn-upload" id="uploadButton">⬆ Upload</button>
        </div>

        <input type="file" id="cameraInput" accept="image/*" capture="environment">
        <input type="file" id="fileInput" accept="image/*" multiple>

        <button class="btn btn-analyze" id="analyzeButton">Analyze Signs</button>

        <div id="outcome"></div>
    </div>

    <script>
        const ERROR_MESSAGE = 'Failed to analyze parking signs. Please try again.';

        // idle -> imagesSelected -> analyzing -> resultShown | errorShown
        // Mirrors CaptureState::apply in capture.rs; keep the two in step.
        let state = { images: [], phase: 'idle', verdict: null };

        function reduce(current, action) {
            const busy = current.phase === 'analyzing';
            const afterEdit = (images) => ({
                images,
                phase: busy ? 'analyzing' : (images.length ? 'imagesSelected' : 'idle'),
                verdict: busy ? current.verdict : null,
            });

            switch (action.type) {
                case 'imageAdded':
                    return afterEdit([...current.images, action.image]);
                case 'imageRemoved':
                    if (action.index >= current.images.length) return current;
                    return afterEdit(current.images.filter((_, i) => i !== action.index));
                case 'analysisStarted':
                    if (busy || !current.images.length) return current;
                    return { ...current, phase: 'analyzing', verdict: null };
                case 'analysisSucceeded':
                    if (!busy) return current;
                    if (!current.images.length) return { ...current, phase: 'idle', verdict: null };
                    return { ...current, phase: 'resultShown', verdict: action.verdict };
                case 'analysisFailed':
                    if (!busy) return current;
                    if (!current.images.length) return { ...current, phase: 'idle', verdict: null };
                    return { ...current, phase: 'errorShown', verdict: null };
                default:
                    return current;
            }
        }

        function dispatch(action) {
            state = reduce(state, action);
            render();
        }

        const gallery = document.getElementById('gallery');
        const analyzeButton = document.getElementById('analyzeButton');
        const outcome = document.getElementById('outcome');
        const cameraInput = document.getElementById('cameraInput');
        const fileInput = document.getElementById('fileInput');

        function el(tag, className, text) {
            const node = document.createElement(tag);
            if (className) node.className = className;
            if (text !== undefined) node.textContent = text;
            return node;
        }

        function renderVerdict(verdict) {
            const block = el('div', 'result');
            const head = el('div', 'verdict-head');
            head.appendChild(el('div', 'icon ' + (verdict.canPark ? 'allowed' : 'denied'),
                verdict.canPark ? '✓' : '✗'));
            head.appendChild(el('h2', null, verdict.canPark ? 'Parking Allowed' : 'No Parking'));
            block.appendChild(head);
            block.appendChild(el('p', 'explanation', verdict.explanation));

            const restrictions = Array.isArray(verdict.restrictions) ? verdict.restrictions : [];
            if (restrictions.length > 0) {
                const section = el('div', 'restrictions');
                section.appendChild(el('h3', null, 'Restrictions:'));
                const list = el('ul');
                restrictions.forEach(r => list.appendChild(el('li', null, r)));
                section.appendChild(list);
                block.appendChild(section);
            }

            if (verdict.timeLimit !== undefined && verdict.timeLimit !== null) {
                block.appendChild(el('p', 'time-limit', `Time limit: ${verdict.timeLimit} minutes`));
            }
            return block;
        }

        function render() {
            gallery.replaceChildren(...state.images.map((src, index) => {
                const thumb = el('div', 'thumb');
                const img = el('img');
                img.src = src;
                img.alt = `Parking sign ${index + 1}`;
                const remove = el('button', null, '✕');
                remove.onclick = () => dispatch({ type: 'imageRemoved', index });
                thumb.append(img, remove);
                return thumb;
            }));

            const busy = state.phase === 'analyzing';
            analyzeButton.style.display = state.images.length ? 'block' : 'none';
            analyzeButton.disabled = busy || !state.images.length;
            analyzeButton.textContent = busy ? 'Analyzing...' : 'Analyze Signs';

            outcome.replaceChildren();
            if (state.phase === 'resultShown') {
                outcome.appendChild(renderVerdict(state.verdict));
            } else if (state.phase === 'errorShown') {
                outcome.appendChild(el('div', 'error', ERROR_MESSAGE));
            }
        }

        function handleFiles(event) {
            Array.from(event.target.files)
                .filter(file => file.type.startsWith('image/'))
                .forEach(file => {
                    const reader = new FileReader();
                    reader.onloadend = () => dispatch({ type: 'imageAdded', image: reader.result });
                    reader.readAsDataURL(file);
                });
            event.target.value = '';
        }

        async function analyze() {
            if (state.phase === 'analyzing' || !state.images.length) return;
            dispatch({ type: 'analysisStarted' });

            try {
                const response = await fetch('/api/analyze', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ images: state.images }),
                });
                if (!response.ok) {
                    throw new Error(`Gateway responded with ${response.status}`);
                }
                dispatch({ type: 'analysisSucceeded', verdict: await response.json() });
            } catch (error) {
                console.error(error);
                dispatch({ type: 'analysisFailed' });
            }
        }

        document.getElementById('cameraButton').addEventListener('click', () => cameraInput.click());
        document.getElementById('uploadButton').addEventListener('click', () => fileInput.click());
        cameraInput.addEventListener('change', handleFiles);
        fileInput.addEventListener('change', handleFiles);
        analyzeButton.addEventListener('click', analyze);

        render();
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn page_posts_to_the_analyze_endpoint() {
        let Html(body) = index().await;
        assert!(body.contains("fetch('/api/analyze'"));
        assert!(body.contains("Failed to analyze parking signs. Please try again."));
        assert!(body.contains(r#"capture="environment""#));
    }

    #[test]
    fn script_reducer_handles_every_capture_action() {
        use crate::capture::Action;

        // One JS case per Action variant; the match fails to compile when a
        // variant is added, pointing here.
        let cases = [
            Action::ImageAdded(crate::capture::CapturedImage::from_bytes("image/png", b"")),
            Action::ImageRemoved(0),
            Action::AnalysisStarted,
            Action::AnalysisSucceeded(crate::verdict::AnalysisVerdict {
                can_park: true,
                explanation: String::new(),
                restrictions: vec![],
                time_limit: None,
            }),
            Action::AnalysisFailed,
        ];
        for action in cases {
            let js_case = match action {
                Action::ImageAdded(_) => "case 'imageAdded':",
                Action::ImageRemoved(_) => "case 'imageRemoved':",
                Action::AnalysisStarted => "case 'analysisStarted':",
                Action::AnalysisSucceeded(_) => "case 'analysisSucceeded':",
                Action::AnalysisFailed => "case 'analysisFailed':",
            };
            assert!(INDEX_HTML.contains(js_case), "missing {js_case}");
        }
    }

    #[test]
    fn script_reducer_keeps_the_empty_means_idle_rule() {
        // Edits outside analysis fall back to idle when nothing is left.
        assert!(INDEX_HTML.contains("(images.length ? 'imagesSelected' : 'idle')"));
        // Completions with every image removed settle to idle.
        let settle = "if (!current.images.length) return { ...current, phase: 'idle', verdict: null };";
        assert_eq!(INDEX_HTML.matches(settle).count(), 2);
        // Analyze is refused while busy or empty.
        assert!(INDEX_HTML.contains("if (busy || !current.images.length) return current;"));
    }
}
